use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{DbPool, DbResult},
    models::{Update, UpdateContent, UpdateStatus},
};

/// Written LP updates: drafting, visibility and publishing.
#[derive(Clone)]
pub struct UpdateService {
    db: Arc<DbPool>,
}

impl UpdateService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> DbResult<Vec<Update>> {
        self.db.updates().list().await
    }

    pub async fn get(&self, id: Uuid) -> DbResult<Option<Update>> {
        self.db.updates().get_by_id(id).await
    }

    /// New updates start as drafts.
    pub async fn create(&self, input: UpdateContent) -> DbResult<Update> {
        self.db.updates().create(input).await
    }

    /// Save title and body and replace the visible funds.
    pub async fn save(&self, id: Uuid, input: UpdateContent) -> DbResult<Update> {
        self.db.updates().save(id, input).await
    }

    pub async fn publish(&self, id: Uuid) -> DbResult<Update> {
        self.db
            .updates()
            .set_status(id, UpdateStatus::Published, Some(Utc::now()))
            .await
    }

    /// Back to draft. The original publish date is kept.
    pub async fn unpublish(&self, id: Uuid) -> DbResult<Update> {
        self.db
            .updates()
            .set_status(id, UpdateStatus::Draft, None)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.db.updates().delete(id).await
    }
}
