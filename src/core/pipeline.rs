use crate::config::import_config::ImportConfig;
use crate::core::parser::parse_sheet;
use crate::core::processor::{BulkImportProcessor, ProcessorSettings};
use crate::core::report::build_report_bundle;
use crate::core::upload::StagedUpload;
use crate::core::{ImportOutcome, MembershipStore, Pipeline, SheetRow, Storage};
use crate::utils::error::Result;

/// 匯入一個上傳檔案的 Pipeline：讀檔解析 → 逐列處理 → 寫出報表。
/// 持有 `StagedUpload`，Pipeline 結束時暫存檔隨之釋放。
pub struct ImportPipeline<S: Storage, M: MembershipStore> {
    storage: S,
    processor: BulkImportProcessor<M>,
    config: ImportConfig,
    upload: StagedUpload,
}

impl<S: Storage, M: MembershipStore> ImportPipeline<S, M> {
    pub fn new(storage: S, store: M, config: ImportConfig, upload: StagedUpload) -> Self {
        let processor = BulkImportProcessor::new(
            store,
            ProcessorSettings {
                defaults: config.defaults.clone(),
                dedupe_within_batch: config.dedupe_within_batch(),
            },
        );
        Self {
            storage,
            processor,
            config,
            upload,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, M: MembershipStore> Pipeline for ImportPipeline<S, M> {
    async fn extract(&self) -> Result<Vec<SheetRow>> {
        tracing::info!(
            "📥 [{}] Reading {} ({})",
            self.config.import.name,
            self.upload.original_name(),
            self.upload.path().display()
        );

        let format = self.upload.check(self.config.max_file_size()).await?;
        let bytes = self.upload.read().await?;
        tracing::debug!("Read {} bytes as {:?}", bytes.len(), format);

        parse_sheet(&bytes, format)
    }

    async fn transform(&self, rows: Vec<SheetRow>) -> Result<ImportOutcome> {
        Ok(self.processor.process(rows).await)
    }

    async fn load(&self, outcome: &ImportOutcome) -> Result<Option<String>> {
        if !self.config.report.enabled {
            tracing::debug!("Report bundle disabled");
            return Ok(None);
        }

        let bundle = build_report_bundle(outcome)?;
        tracing::debug!("Writing report bundle ({} bytes)", bundle.len());
        let path = self
            .storage
            .write_file(&self.config.report.filename, &bundle)
            .await?;

        Ok(Some(path))
    }
}
