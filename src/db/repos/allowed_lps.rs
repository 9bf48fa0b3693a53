use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{AllowedLp, AllowedLpField, AllowedLpWithAccess, CreateAllowedLp, FieldValue},
};

#[async_trait]
pub trait AllowedLpRepo: Send + Sync {
    /// Insert an allow-list entry together with its fund grants.
    async fn create(&self, input: CreateAllowedLp) -> DbResult<AllowedLp>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<AllowedLp>>;
    /// Case-insensitive lookup.
    async fn get_by_email(&self, email: &str) -> DbResult<Option<AllowedLp>>;
    /// All entries ordered by email, with fund grants and profile activity.
    async fn list_with_access(&self) -> DbResult<Vec<AllowedLpWithAccess>>;
    async fn update_field(&self, id: Uuid, field: AllowedLpField, value: FieldValue)
    -> DbResult<()>;
    /// Replace the entry's fund grants with exactly `fund_ids`.
    async fn set_funds(&self, id: Uuid, fund_ids: &[Uuid]) -> DbResult<()>;
    async fn fund_ids(&self, id: Uuid) -> DbResult<Vec<Uuid>>;
    /// Delete the entry. Fund grants and any linked profile cascade.
    async fn delete(&self, id: Uuid) -> DbResult<()>;
    async fn count(&self) -> DbResult<i64>;
}
