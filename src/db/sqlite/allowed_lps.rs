use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{LP_FUND_ACCESS, map_write_error, parse_uuid, update_column};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::AllowedLpRepo,
    },
    models::{
        AllowedLp, AllowedLpField, AllowedLpWithAccess, CreateAllowedLp, EditableField,
        FieldValue, normalize_email,
    },
};

pub struct SqliteAllowedLpRepo {
    pool: SqlitePool,
}

impl SqliteAllowedLpRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_allowed_lp(row: &SqliteRow) -> DbResult<AllowedLp> {
        Ok(AllowedLp {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            email: row.get("email"),
            name: row.get("name"),
            organization: row.get("organization"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl AllowedLpRepo for SqliteAllowedLpRepo {
    async fn create(&self, input: CreateAllowedLp) -> DbResult<AllowedLp> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let email = normalize_email(&input.email);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO allowed_lps (id, email, name, organization, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&email)
        .bind(&input.name)
        .bind(&input.organization)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, || format!("LP with email '{}' already exists", email)))?;

        LP_FUND_ACCESS.replace(&mut *tx, id, &input.fund_ids).await?;

        tx.commit().await?;

        Ok(AllowedLp {
            id,
            email,
            name: input.name,
            organization: input.organization,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<AllowedLp>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, organization, created_at, updated_at
            FROM allowed_lps
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_allowed_lp).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<AllowedLp>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, organization, created_at, updated_at
            FROM allowed_lps
            WHERE email = ? COLLATE NOCASE
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_allowed_lp).transpose()
    }

    async fn list_with_access(&self) -> DbResult<Vec<AllowedLpWithAccess>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.email, a.name, a.organization, a.created_at, a.updated_at,
                   u.last_login_at
            FROM allowed_lps a
            LEFT JOIN users u ON u.allowed_lp_id = a.id
            ORDER BY a.email
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut access = LP_FUND_ACCESS.all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                let lp = Self::parse_allowed_lp(row)?;
                Ok(AllowedLpWithAccess {
                    fund_ids: access.remove(&lp.id).unwrap_or_default(),
                    last_login_at: row.get("last_login_at"),
                    lp,
                })
            })
            .collect()
    }

    async fn update_field(
        &self,
        id: Uuid,
        field: AllowedLpField,
        value: FieldValue,
    ) -> DbResult<()> {
        update_column(&self.pool, "allowed_lps", field.column(), id, value).await
    }

    async fn set_funds(&self, id: Uuid, fund_ids: &[Uuid]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE allowed_lps SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        LP_FUND_ACCESS.replace(&mut *tx, id, fund_ids).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn fund_ids(&self, id: Uuid) -> DbResult<Vec<Uuid>> {
        LP_FUND_ACCESS.for_owner(&self.pool, id).await
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM allowed_lps WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn count(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM allowed_lps")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }
}
