use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{COMPANY_FUNDS, map_write_error, parse_enum, parse_uuid, update_column};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::CompanyRepo,
    },
    models::{Company, CompanyField, CompanyStatus, CreateCompany, EditableField, FieldValue},
};

const COMPANY_COLUMNS: &str = "c.id, c.name, c.sector, c.location, c.status, \
    c.ownership_percentage, c.total_invested, c.first_investment_date, c.website_url, \
    c.description, c.created_at, c.updated_at";

pub struct SqliteCompanyRepo {
    pool: SqlitePool,
}

impl SqliteCompanyRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_company(row: &SqliteRow, fund_ids: Vec<Uuid>) -> DbResult<Company> {
        Ok(Company {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            name: row.get("name"),
            sector: row.get("sector"),
            location: row.get("location"),
            status: parse_enum(
                "company status",
                &row.get::<String, _>("status"),
                CompanyStatus::from_str,
            )?,
            ownership_percentage: row.get("ownership_percentage"),
            total_invested: row.get("total_invested"),
            first_investment_date: row.get("first_investment_date"),
            website_url: row.get("website_url"),
            description: row.get("description"),
            fund_ids,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn collect(&self, rows: Vec<SqliteRow>) -> DbResult<Vec<Company>> {
        let mut links = COMPANY_FUNDS.all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let id = parse_uuid(&row.get::<String, _>("id"))?;
                Self::parse_company(row, links.remove(&id).unwrap_or_default())
            })
            .collect()
    }
}

#[async_trait]
impl CompanyRepo for SqliteCompanyRepo {
    async fn create(&self, input: CreateCompany) -> DbResult<Company> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO companies (
                id, name, sector, location, status, ownership_percentage, total_invested,
                first_investment_date, website_url, description, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.sector)
        .bind(&input.location)
        .bind(input.status.as_str())
        .bind(input.ownership_percentage)
        .bind(input.total_invested)
        .bind(input.first_investment_date)
        .bind(&input.website_url)
        .bind(&input.description)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, || format!("Company '{}' already exists", input.name)))?;

        COMPANY_FUNDS.replace(&mut *tx, id, &input.fund_ids).await?;

        tx.commit().await?;

        let mut fund_ids = input.fund_ids;
        fund_ids.sort();
        fund_ids.dedup();

        Ok(Company {
            id,
            name: input.name,
            sector: input.sector,
            location: input.location,
            status: input.status,
            ownership_percentage: input.ownership_percentage,
            total_invested: input.total_invested,
            first_investment_date: input.first_investment_date,
            website_url: input.website_url,
            description: input.description,
            fund_ids,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Company>> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies c WHERE c.id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let fund_ids = COMPANY_FUNDS.for_owner(&self.pool, id).await?;
                Self::parse_company(&row, fund_ids).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> DbResult<Vec<Company>> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies c ORDER BY c.name COLLATE NOCASE");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        self.collect(rows).await
    }

    async fn list_for_fund(&self, fund_id: Uuid) -> DbResult<Vec<Company>> {
        let sql = format!(
            r#"
            SELECT {COMPANY_COLUMNS}
            FROM companies c
            INNER JOIN company_funds cf ON cf.company_id = c.id
            WHERE cf.fund_id = ?
            ORDER BY c.name COLLATE NOCASE
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(fund_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        self.collect(rows).await
    }

    async fn update_field(
        &self,
        id: Uuid,
        field: CompanyField,
        value: FieldValue,
    ) -> DbResult<()> {
        update_column(&self.pool, "companies", field.column(), id, value).await
    }

    async fn set_funds(&self, id: Uuid, fund_ids: &[Uuid]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE companies SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        COMPANY_FUNDS.replace(&mut *tx, id, fund_ids).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn count_investments(&self, id: Uuid) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM investments WHERE company_id = ?")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        if self.count_investments(id).await? > 0 {
            return Err(DbError::Conflict(
                "Cannot delete: this company has investments".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    DbError::Conflict("Cannot delete: this company has investments".to_string())
                }
                _ => DbError::from(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
