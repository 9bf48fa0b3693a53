use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateFund, Fund},
};

#[async_trait]
pub trait FundRepo: Send + Sync {
    async fn create(&self, input: CreateFund) -> DbResult<Fund>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Fund>>;
    /// All funds ordered by slug.
    async fn list(&self) -> DbResult<Vec<Fund>>;
    /// Funds granted to an allow-list entry, ordered by slug.
    async fn list_for_allowed_lp(&self, allowed_lp_id: Uuid) -> DbResult<Vec<Fund>>;
}
