use crate::core::member::normalize_email;
use crate::domain::model::{MembershipRecord, NewMembership};
use crate::domain::ports::MembershipStore;
use crate::utils::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Datelike;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    records: HashMap<String, MembershipRecord>,
    next_seq: u64,
}

/// 記憶體中的會員儲存端，email 唯一並依序配發會員編號
#[derive(Clone, Default)]
pub struct InMemoryMembershipStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 預先放入已存在的會員
    pub async fn seed(&self, records: impl IntoIterator<Item = MembershipRecord>) {
        let mut inner = self.inner.lock().await;
        for record in records {
            inner
                .records
                .insert(normalize_email(&record.details.email), record);
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<MembershipRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.records.get(&normalize_email(email)).cloned())
    }

    async fn insert(&self, membership: NewMembership) -> StoreResult<MembershipRecord> {
        let mut inner = self.inner.lock().await;
        let key = normalize_email(&membership.email);
        if inner.records.contains_key(&key) {
            return Err(StoreError::Duplicate { email: key });
        }

        inner.next_seq += 1;
        let record = MembershipRecord {
            membership_id: format!(
                "MEM-{}-{:05}",
                membership.purchase_date.year(),
                inner.next_seq
            ),
            details: membership,
        };
        inner.records.insert(key, record.clone());
        Ok(record)
    }
}
