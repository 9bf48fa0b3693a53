use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid, update_column};
use crate::{
    db::{error::DbResult, repos::FundMetricsRepo},
    models::{CreateQuarter, EditableField, FieldValue, FundMetrics, FundMetricsField},
};

const METRICS_COLUMNS: &str = "id, fund_id, quarter, year, as_of_date, tvpi, dpi, moic, irr, \
    fund_size, capital_called, invested_capital, capital_distributed, dry_powder, \
    num_investments, primary_investments, follow_on_investments, median_initial_check, \
    median_initial_valuation, created_at, updated_at";

pub struct SqliteFundMetricsRepo {
    pool: SqlitePool,
}

impl SqliteFundMetricsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_metrics(row: &SqliteRow) -> DbResult<FundMetrics> {
        Ok(FundMetrics {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            fund_id: parse_uuid(&row.get::<String, _>("fund_id"))?,
            quarter: row.get("quarter"),
            year: row.get("year"),
            as_of_date: row.get("as_of_date"),
            tvpi: row.get("tvpi"),
            dpi: row.get("dpi"),
            moic: row.get("moic"),
            irr: row.get("irr"),
            fund_size: row.get("fund_size"),
            capital_called: row.get("capital_called"),
            invested_capital: row.get("invested_capital"),
            capital_distributed: row.get("capital_distributed"),
            dry_powder: row.get("dry_powder"),
            num_investments: row.get("num_investments"),
            primary_investments: row.get("primary_investments"),
            follow_on_investments: row.get("follow_on_investments"),
            median_initial_check: row.get("median_initial_check"),
            median_initial_valuation: row.get("median_initial_valuation"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl FundMetricsRepo for SqliteFundMetricsRepo {
    async fn create_quarter(&self, input: CreateQuarter) -> DbResult<FundMetrics> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO fund_metrics (id, fund_id, quarter, year, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(input.fund_id.to_string())
        .bind(input.quarter)
        .bind(input.year)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, || {
                format!("Q{} {} already exists for this fund", input.quarter, input.year)
            })
        })?;

        Ok(FundMetrics {
            id,
            fund_id: input.fund_id,
            quarter: input.quarter,
            year: input.year,
            as_of_date: None,
            tvpi: None,
            dpi: None,
            moic: None,
            irr: None,
            fund_size: None,
            capital_called: None,
            invested_capital: None,
            capital_distributed: None,
            dry_powder: None,
            num_investments: None,
            primary_investments: None,
            follow_on_investments: None,
            median_initial_check: None,
            median_initial_valuation: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn list_for_fund(&self, fund_id: Uuid) -> DbResult<Vec<FundMetrics>> {
        let sql = format!(
            "SELECT {METRICS_COLUMNS} FROM fund_metrics WHERE fund_id = ? ORDER BY year, quarter"
        );
        let rows = sqlx::query(&sql)
            .bind(fund_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_metrics).collect()
    }

    async fn update_field(
        &self,
        id: Uuid,
        field: FundMetricsField,
        value: FieldValue,
    ) -> DbResult<()> {
        update_column(&self.pool, "fund_metrics", field.column(), id, value).await
    }

    async fn last_updated_at(&self) -> DbResult<Option<DateTime<Utc>>> {
        let row = sqlx::query(
            "SELECT updated_at FROM fund_metrics ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get("updated_at")))
    }
}
