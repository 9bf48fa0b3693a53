use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{Update, UpdateContent, UpdateStatus},
};

#[async_trait]
pub trait UpdateRepo: Send + Sync {
    /// Insert a draft with its fund visibility.
    async fn create(&self, input: UpdateContent) -> DbResult<Update>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Update>>;
    /// All updates, most recently created first.
    async fn list(&self) -> DbResult<Vec<Update>>;
    /// Overwrite title and body and replace fund visibility.
    async fn save(&self, id: Uuid, input: UpdateContent) -> DbResult<Update>;
    /// Change the status. `published_at` is only overwritten when given, so
    /// an unpublished update keeps its original publish date.
    async fn set_status(
        &self,
        id: Uuid,
        status: UpdateStatus,
        published_at: Option<DateTime<Utc>>,
    ) -> DbResult<Update>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
    async fn count_published(&self) -> DbResult<i64>;
    /// Published updates visible to a fund, most recently published first.
    async fn list_published_for_fund(&self, fund_id: Uuid) -> DbResult<Vec<Update>>;
}
