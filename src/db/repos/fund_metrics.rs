use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateQuarter, FieldValue, FundMetrics, FundMetricsField},
};

#[async_trait]
pub trait FundMetricsRepo: Send + Sync {
    /// Insert an empty row for a quarter. Fails with `Conflict` if the quarter
    /// already exists for the fund.
    async fn create_quarter(&self, input: CreateQuarter) -> DbResult<FundMetrics>;
    /// Rows for a fund in chronological order.
    async fn list_for_fund(&self, fund_id: Uuid) -> DbResult<Vec<FundMetrics>>;
    async fn update_field(
        &self,
        id: Uuid,
        field: FundMetricsField,
        value: FieldValue,
    ) -> DbResult<()>;
    /// Most recent edit across all metrics rows.
    async fn last_updated_at(&self) -> DbResult<Option<DateTime<Utc>>>;
}
