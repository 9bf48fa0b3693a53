use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::{map_write_error, parse_enum, parse_uuid, update_column};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::InvestmentRepo,
    },
    models::{
        CreateInvestment, EditableField, FieldValue, Investment, InvestmentField, InvestmentRole,
        InvestmentStage, InvestmentType,
    },
};

const INVESTMENT_SELECT: &str = r#"
    SELECT i.id, i.company_id, c.name AS company_name, i.fund_id, i.investment_date,
           i.investment_type, i.stage, i.amount, i.ownership_percentage, i.role,
           i.post_money_valuation, i.created_at, i.updated_at
    FROM investments i
    INNER JOIN companies c ON c.id = i.company_id
"#;

pub struct SqliteInvestmentRepo {
    pool: SqlitePool,
}

impl SqliteInvestmentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_investment(row: &SqliteRow) -> DbResult<Investment> {
        let investment_type: Option<String> = row.get("investment_type");
        let stage: Option<String> = row.get("stage");
        let role: Option<String> = row.get("role");

        Ok(Investment {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            company_id: parse_uuid(&row.get::<String, _>("company_id"))?,
            company_name: row.get("company_name"),
            fund_id: parse_uuid(&row.get::<String, _>("fund_id"))?,
            investment_date: row.get("investment_date"),
            investment_type: investment_type
                .map(|s| parse_enum("investment type", &s, InvestmentType::from_str))
                .transpose()?,
            stage: stage
                .map(|s| parse_enum("investment stage", &s, InvestmentStage::from_str))
                .transpose()?,
            amount: row.get("amount"),
            ownership_percentage: row.get("ownership_percentage"),
            role: role
                .map(|s| parse_enum("investment role", &s, InvestmentRole::from_str))
                .transpose()?,
            post_money_valuation: row.get("post_money_valuation"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl InvestmentRepo for SqliteInvestmentRepo {
    async fn create(&self, input: CreateInvestment) -> DbResult<Investment> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO investments (
                id, company_id, fund_id, investment_date, investment_type, stage, amount,
                ownership_percentage, role, post_money_valuation, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(input.company_id.to_string())
        .bind(input.fund_id.to_string())
        .bind(input.investment_date)
        .bind(input.investment_type.map(|t| t.as_str()))
        .bind(input.stage.map(|s| s.as_str()))
        .bind(input.amount)
        .bind(input.ownership_percentage)
        .bind(input.role.map(|r| r.as_str()))
        .bind(input.post_money_valuation)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, || "Investment already exists".to_string()))?;

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Investment>> {
        let sql = format!("{INVESTMENT_SELECT} WHERE i.id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::parse_investment).transpose()
    }

    async fn list(&self) -> DbResult<Vec<Investment>> {
        let sql = format!("{INVESTMENT_SELECT} ORDER BY i.investment_date DESC, i.created_at DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(Self::parse_investment).collect()
    }

    async fn list_for_fund(&self, fund_id: Uuid) -> DbResult<Vec<Investment>> {
        let sql = format!(
            "{INVESTMENT_SELECT} WHERE i.fund_id = ? ORDER BY i.investment_date DESC, i.created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(fund_id.to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_investment).collect()
    }

    async fn update_field(
        &self,
        id: Uuid,
        field: InvestmentField,
        value: FieldValue,
    ) -> DbResult<()> {
        update_column(&self.pool, "investments", field.column(), id, value).await
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM investments WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
