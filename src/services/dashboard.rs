use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{DbPool, DbResult};

/// Headline numbers for the admin landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub lp_count: i64,
    pub published_updates: i64,
    /// Most recent edit to any metrics row.
    pub metrics_updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn summary(&self) -> DbResult<DashboardSummary> {
        Ok(DashboardSummary {
            lp_count: self.db.allowed_lps().count().await?,
            published_updates: self.db.updates().count_published().await?,
            metrics_updated_at: self.db.fund_metrics().last_updated_at().await?,
        })
    }
}
