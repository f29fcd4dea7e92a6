use crate::domain::model::{MembershipRecord, NewMembership};
use crate::domain::ports::MembershipStore;
use crate::utils::error::StoreResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// 試跑用：查詢照常轉給底層儲存端，寫入只產生假的會員編號，不會持久化
pub struct DryRunStore<M: MembershipStore> {
    inner: M,
    next_seq: AtomicU64,
}

impl<M: MembershipStore> DryRunStore<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            next_seq: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl<M: MembershipStore> MembershipStore for DryRunStore<M> {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<MembershipRecord>> {
        self.inner.find_by_email(email).await
    }

    async fn insert(&self, membership: NewMembership) -> StoreResult<MembershipRecord> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("🔍 Dry run: would create membership for {}", membership.email);
        Ok(MembershipRecord {
            membership_id: format!("DRYRUN-{:05}", seq),
            details: membership,
        })
    }
}
