use crate::config::import_config::MemberDefaults;
use crate::core::member::normalize_member;
use crate::domain::model::{
    ImportFailure, ImportOutcome, ImportRow, ImportSuccess, NewMembership, SheetRow,
};
use crate::domain::ports::MembershipStore;
use crate::utils::error::RowError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    pub defaults: MemberDefaults,
    pub dedupe_within_batch: bool,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            defaults: MemberDefaults::default(),
            dedupe_within_batch: true,
        }
    }
}

/// 逐列處理匯入資料。列與列之間互不影響，依檔案順序一次處理一列，
/// 每列的查詢與寫入都完成後才處理下一列。
pub struct BulkImportProcessor<M: MembershipStore> {
    store: M,
    settings: ProcessorSettings,
}

impl<M: MembershipStore> BulkImportProcessor<M> {
    pub fn new(store: M, settings: ProcessorSettings) -> Self {
        Self { store, settings }
    }

    pub async fn process(&self, rows: Vec<SheetRow>) -> ImportOutcome {
        self.process_at(rows, Utc::now()).await
    }

    /// `processed_at` 是沒有購買日期時使用的預設值，整批共用同一個時間
    pub async fn process_at(&self, rows: Vec<SheetRow>, processed_at: DateTime<Utc>) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        let mut seen_emails: HashMap<String, usize> = HashMap::new();

        for sheet_row in rows {
            let row = match sheet_row {
                SheetRow::Row(row) => row,
                SheetRow::Unreadable(unreadable) => {
                    let error = RowError::Unreadable {
                        message: unreadable.message,
                    };
                    outcome.record_failure(ImportFailure {
                        row: unreadable.row_number,
                        data: unreadable.raw_fields,
                        error: error.to_string(),
                    });
                    continue;
                }
            };

            match self.import_row(&row, processed_at, &mut seen_emails).await {
                Ok(entry) => {
                    tracing::debug!(
                        "✅ Row {}: imported {} as {}",
                        row.row_number,
                        entry.email,
                        entry.membership_id
                    );
                    outcome.record_success(entry);
                }
                Err(error) => {
                    tracing::debug!("❌ Row {}: {}", row.row_number, error);
                    outcome.record_failure(ImportFailure {
                        row: row.row_number,
                        data: row.raw_fields,
                        error: error.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "📊 Processed {} rows: {} imported, {} failed",
            outcome.total,
            outcome.success.len(),
            outcome.failed.len()
        );
        outcome
    }

    async fn import_row(
        &self,
        row: &ImportRow,
        processed_at: DateTime<Utc>,
        seen_emails: &mut HashMap<String, usize>,
    ) -> Result<ImportSuccess, RowError> {
        let member = normalize_member(&row.raw_fields, &self.settings.defaults, processed_at)?;

        if self.settings.dedupe_within_batch {
            if let Some(first_row) = seen_emails.get(&member.email) {
                return Err(RowError::DuplicateInBatch {
                    email: member.email,
                    first_row: *first_row,
                });
            }
        }

        if self.store.find_by_email(&member.email).await?.is_some() {
            return Err(RowError::DuplicateEmail {
                email: member.email,
            });
        }

        let email = member.email.clone();
        let record = self.store.insert(NewMembership::from(member)).await?;
        // 只記錄寫入成功的 email，失敗的列不擋後面同 email 的列
        if self.settings.dedupe_within_batch {
            seen_emails.insert(email, row.row_number);
        }

        Ok(ImportSuccess {
            row: row.row_number,
            membership_id: record.membership_id,
            name: record.details.name,
            email: record.details.email,
            valid_from: record.details.valid_from,
            valid_until: record.details.valid_until,
        })
    }
}
