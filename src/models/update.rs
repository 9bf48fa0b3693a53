use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

db_enum! {
    pub enum UpdateStatus {
        Draft => "draft",
        Published => "published",
    }
}

/// Written update to LPs. The body is markdown, stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Update {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub status: UpdateStatus,
    pub published_at: Option<DateTime<Utc>>,
    /// Funds whose LPs can read this update once published
    pub fund_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Update {
    pub fn is_published(&self) -> bool {
        self.status == UpdateStatus::Published
    }

    /// Whether the update is published and visible to any of `fund_ids`.
    pub fn is_visible_to_any(&self, fund_ids: &[Uuid]) -> bool {
        self.is_published() && self.fund_ids.iter().any(|id| fund_ids.contains(id))
    }
}

/// Create or save body for an update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContent {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 200000))]
    pub body: String,
    #[serde(default)]
    pub fund_ids: Vec<Uuid>,
}
