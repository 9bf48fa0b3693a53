use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{DbError, DbPool, DbResult},
    models::{CreateQuarter, FieldUpdate, FundMetrics, FundMetricsField, parse_field_value},
};

/// Quarterly fund metrics entry.
#[derive(Clone)]
pub struct FundMetricsService {
    db: Arc<DbPool>,
}

impl FundMetricsService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Metrics rows for a fund, oldest quarter first
    pub async fn list_for_fund(&self, fund_id: Uuid) -> DbResult<Vec<FundMetrics>> {
        self.db.fund_metrics().list_for_fund(fund_id).await
    }

    /// Add an empty row for a quarter. Duplicate quarters conflict.
    pub async fn create_quarter(&self, input: CreateQuarter) -> DbResult<FundMetrics> {
        self.db.fund_metrics().create_quarter(input).await
    }

    pub async fn update_field(
        &self,
        id: Uuid,
        update: FieldUpdate<FundMetricsField>,
    ) -> DbResult<()> {
        let value =
            parse_field_value(update.field, update.value.as_deref()).map_err(DbError::Validation)?;
        self.db
            .fund_metrics()
            .update_field(id, update.field, value)
            .await
    }
}
