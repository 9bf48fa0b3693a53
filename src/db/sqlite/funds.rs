use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{map_write_error, parse_enum, parse_uuid};
use crate::{
    db::{error::DbResult, repos::FundRepo},
    models::{CreateFund, Fund, FundStatus},
};

pub struct SqliteFundRepo {
    pool: SqlitePool,
}

impl SqliteFundRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_fund(row: &SqliteRow) -> DbResult<Fund> {
        Ok(Fund {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            name: row.get("name"),
            slug: row.get("slug"),
            start_date: row.get("start_date"),
            status: parse_enum("fund status", &row.get::<String, _>("status"), FundStatus::from_str)?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl FundRepo for SqliteFundRepo {
    async fn create(&self, input: CreateFund) -> DbResult<Fund> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO funds (id, name, slug, start_date, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.start_date)
        .bind(input.status.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, || format!("Fund with slug '{}' already exists", input.slug)))?;

        Ok(Fund {
            id,
            name: input.name,
            slug: input.slug,
            start_date: input.start_date,
            status: input.status,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Fund>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, slug, start_date, status, created_at, updated_at
            FROM funds
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_fund).transpose()
    }

    async fn list(&self) -> DbResult<Vec<Fund>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, start_date, status, created_at, updated_at
            FROM funds
            ORDER BY slug
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::parse_fund).collect()
    }

    async fn list_for_allowed_lp(&self, allowed_lp_id: Uuid) -> DbResult<Vec<Fund>> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.name, f.slug, f.start_date, f.status, f.created_at, f.updated_at
            FROM funds f
            INNER JOIN lp_fund_access a ON a.fund_id = f.id
            WHERE a.allowed_lp_id = ?
            ORDER BY f.slug
            "#,
        )
        .bind(allowed_lp_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::parse_fund).collect()
    }
}
