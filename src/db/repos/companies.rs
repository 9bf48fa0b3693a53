use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{Company, CompanyField, CreateCompany, FieldValue},
};

#[async_trait]
pub trait CompanyRepo: Send + Sync {
    async fn create(&self, input: CreateCompany) -> DbResult<Company>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Company>>;
    /// All companies ordered by name.
    async fn list(&self) -> DbResult<Vec<Company>>;
    /// Companies held by a fund, ordered by name.
    async fn list_for_fund(&self, fund_id: Uuid) -> DbResult<Vec<Company>>;
    async fn update_field(&self, id: Uuid, field: CompanyField, value: FieldValue)
    -> DbResult<()>;
    async fn set_funds(&self, id: Uuid, fund_ids: &[Uuid]) -> DbResult<()>;
    async fn count_investments(&self, id: Uuid) -> DbResult<i64>;
    /// Delete the company. Fails with `Conflict` while investments reference it.
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}
