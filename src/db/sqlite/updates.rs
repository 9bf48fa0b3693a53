use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{UPDATE_FUND_VISIBILITY, parse_enum, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::UpdateRepo,
    },
    models::{Update, UpdateContent, UpdateStatus},
};

pub struct SqliteUpdateRepo {
    pool: SqlitePool,
}

impl SqliteUpdateRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_update(row: &SqliteRow, fund_ids: Vec<Uuid>) -> DbResult<Update> {
        Ok(Update {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            title: row.get("title"),
            body: row.get("body"),
            status: parse_enum(
                "update status",
                &row.get::<String, _>("status"),
                UpdateStatus::from_str,
            )?,
            published_at: row.get("published_at"),
            fund_ids,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn collect(&self, rows: Vec<SqliteRow>) -> DbResult<Vec<Update>> {
        let mut visibility = UPDATE_FUND_VISIBILITY.all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let id = parse_uuid(&row.get::<String, _>("id"))?;
                Self::parse_update(row, visibility.remove(&id).unwrap_or_default())
            })
            .collect()
    }
}

#[async_trait]
impl UpdateRepo for SqliteUpdateRepo {
    async fn create(&self, input: UpdateContent) -> DbResult<Update> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO updates (id, title, body, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.title)
        .bind(&input.body)
        .bind(UpdateStatus::Draft.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        UPDATE_FUND_VISIBILITY
            .replace(&mut *tx, id, &input.fund_ids)
            .await?;

        tx.commit().await?;

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Update>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, body, status, published_at, created_at, updated_at
            FROM updates
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let fund_ids = UPDATE_FUND_VISIBILITY.for_owner(&self.pool, id).await?;
                Self::parse_update(&row, fund_ids).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> DbResult<Vec<Update>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, body, status, published_at, created_at, updated_at
            FROM updates
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.collect(rows).await
    }

    async fn save(&self, id: Uuid, input: UpdateContent) -> DbResult<Update> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE updates SET title = ?, body = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.title)
        .bind(&input.body)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        UPDATE_FUND_VISIBILITY
            .replace(&mut *tx, id, &input.fund_ids)
            .await?;

        tx.commit().await?;

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: UpdateStatus,
        published_at: Option<DateTime<Utc>>,
    ) -> DbResult<Update> {
        let result = sqlx::query(
            r#"
            UPDATE updates SET status = ?, published_at = COALESCE(?, published_at), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(published_at)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM updates WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn count_published(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM updates WHERE status = 'published'")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn list_published_for_fund(&self, fund_id: Uuid) -> DbResult<Vec<Update>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.title, u.body, u.status, u.published_at, u.created_at, u.updated_at
            FROM updates u
            INNER JOIN update_fund_visibility v ON v.update_id = u.id
            WHERE v.fund_id = ? AND u.status = 'published'
            ORDER BY u.published_at DESC
            "#,
        )
        .bind(fund_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        self.collect(rows).await
    }
}
