use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{map_write_error, parse_uuid};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::UserRepo,
    },
    models::{CreateUserProfile, Role, UserProfile},
};

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_user(row: &SqliteRow) -> DbResult<UserProfile> {
        let allowed_lp_id: Option<String> = row.get("allowed_lp_id");
        Ok(UserProfile {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            email: row.get("email"),
            allowed_lp_id: allowed_lp_id.as_deref().map(parse_uuid).transpose()?,
            role: Role::from_db(&row.get::<String, _>("role")),
            last_login_at: row.get("last_login_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn get_where(&self, column: &'static str, value: String) -> DbResult<Option<UserProfile>> {
        let sql = format!(
            r#"
            SELECT id, email, allowed_lp_id, role, last_login_at, created_at, updated_at
            FROM users
            WHERE {column} = ?
            "#
        );
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_user).transpose()
    }
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn create(&self, input: CreateUserProfile) -> DbResult<UserProfile> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, allowed_lp_id, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(input.id.to_string())
        .bind(&input.email)
        .bind(input.allowed_lp_id.map(|id| id.to_string()))
        .bind(input.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, || {
                format!("A profile already exists for user '{}'", input.email)
            })
        })?;

        Ok(UserProfile {
            id: input.id,
            email: input.email,
            allowed_lp_id: input.allowed_lp_id,
            role: input.role,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<UserProfile>> {
        self.get_where("id", id.to_string()).await
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<UserProfile>> {
        self.get_where("email", email.to_string()).await
    }

    async fn get_by_allowed_lp(&self, allowed_lp_id: Uuid) -> DbResult<Option<UserProfile>> {
        self.get_where("allowed_lp_id", allowed_lp_id.to_string())
            .await
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> DbResult<Option<Role>> {
        let row = sqlx::query(
            r#"
            UPDATE users SET last_login_at = ?
            WHERE id = ?
            RETURNING role
            "#,
        )
        .bind(at)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Role::from_db(&row.get::<String, _>("role"))))
    }

    async fn set_role(&self, id: Uuid, role: Role) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET role = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(role.as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, || "Role change conflicts with profile".to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
