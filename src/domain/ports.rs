use crate::domain::model::{ImportOutcome, MembershipRecord, NewMembership, SheetRow};
use crate::utils::error::{Result, StoreResult};
use async_trait::async_trait;

/// 報表輸出用的儲存端
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// 會員資料的持久化協作者，以 email（小寫、trim）為唯一鍵
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<MembershipRecord>>;
    async fn insert(&self, membership: NewMembership) -> StoreResult<MembershipRecord>;
}

#[async_trait]
impl<T: MembershipStore + ?Sized> MembershipStore for Box<T> {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<MembershipRecord>> {
        (**self).find_by_email(email).await
    }

    async fn insert(&self, membership: NewMembership) -> StoreResult<MembershipRecord> {
        (**self).insert(membership).await
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<SheetRow>>;
    async fn transform(&self, rows: Vec<SheetRow>) -> Result<ImportOutcome>;
    async fn load(&self, outcome: &ImportOutcome) -> Result<Option<String>>;
}
