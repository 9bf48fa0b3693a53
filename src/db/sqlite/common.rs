use std::collections::HashMap;

use chrono::Utc;
use sqlx::{
    Row, Sqlite, SqliteConnection, SqlitePool,
    query::Query,
    sqlite::SqliteArguments,
};
use uuid::Uuid;

use crate::{
    db::error::{DbError, DbResult},
    models::FieldValue,
};

/// Parse a UUID string from the database, returning a DbError on failure
pub fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {}", e)))
}

/// Parse a stored enum value, returning a DbError on unknown values.
pub fn parse_enum<T>(column: &str, s: &str, parse: impl Fn(&str) -> Option<T>) -> DbResult<T> {
    parse(s).ok_or_else(|| DbError::Internal(format!("Invalid {} in database: {}", column, s)))
}

/// Map constraint failures from a write into domain errors.
///
/// Unique violations become `Conflict` with `conflict_message`; foreign key and
/// check violations become `Validation`.
pub fn map_write_error(err: sqlx::Error, conflict_message: impl FnOnce() -> String) -> DbError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DbError::Conflict(conflict_message())
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            DbError::Validation(format!("Referenced record does not exist: {}", db_err))
        }
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
            DbError::Validation(format!("Value rejected by constraint: {}", db_err))
        }
        _ => DbError::from(err),
    }
}

/// Bind a parsed inline-edit value.
pub fn bind_field_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: FieldValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        FieldValue::Null => query.bind(None::<String>),
        FieldValue::Text(s) => query.bind(s),
        FieldValue::Real(v) => query.bind(v),
        FieldValue::Integer(v) => query.bind(v),
        FieldValue::Date(d) => query.bind(d),
    }
}

/// Set one column of one row and bump `updated_at`.
///
/// `table` and `column` must come from a closed set of identifiers, never
/// from request input.
pub async fn update_column(
    pool: &SqlitePool,
    table: &'static str,
    column: &'static str,
    id: Uuid,
    value: FieldValue,
) -> DbResult<()> {
    let sql = format!("UPDATE {table} SET {column} = ?, updated_at = ? WHERE id = ?");

    let result = bind_field_value(sqlx::query(&sql), value)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| map_write_error(e, || format!("Duplicate value for '{column}'")))?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// A many-to-many link table keyed by `(owner_column, fund_id)`.
#[derive(Debug, Clone, Copy)]
pub struct FundLinks {
    pub table: &'static str,
    pub owner_column: &'static str,
}

pub const LP_FUND_ACCESS: FundLinks = FundLinks {
    table: "lp_fund_access",
    owner_column: "allowed_lp_id",
};

pub const COMPANY_FUNDS: FundLinks = FundLinks {
    table: "company_funds",
    owner_column: "company_id",
};

pub const UPDATE_FUND_VISIBILITY: FundLinks = FundLinks {
    table: "update_fund_visibility",
    owner_column: "update_id",
};

impl FundLinks {
    /// Replace every link for `owner_id` with `fund_ids`.
    pub async fn replace(
        &self,
        conn: &mut SqliteConnection,
        owner_id: Uuid,
        fund_ids: &[Uuid],
    ) -> DbResult<()> {
        let delete = format!("DELETE FROM {} WHERE {} = ?", self.table, self.owner_column);
        sqlx::query(&delete)
            .bind(owner_id.to_string())
            .execute(&mut *conn)
            .await?;

        let insert = format!(
            "INSERT OR IGNORE INTO {} ({}, fund_id) VALUES (?, ?)",
            self.table, self.owner_column
        );
        for fund_id in fund_ids {
            sqlx::query(&insert)
                .bind(owner_id.to_string())
                .bind(fund_id.to_string())
                .execute(&mut *conn)
                .await
                .map_err(|e| map_write_error(e, || "Duplicate fund link".to_string()))?;
        }

        Ok(())
    }

    /// Fund ids linked to one owner, in a stable order.
    pub async fn for_owner(&self, pool: &SqlitePool, owner_id: Uuid) -> DbResult<Vec<Uuid>> {
        let sql = format!(
            "SELECT fund_id FROM {} WHERE {} = ? ORDER BY fund_id",
            self.table, self.owner_column
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id.to_string())
            .fetch_all(pool)
            .await?;

        rows.iter()
            .map(|row| parse_uuid(&row.get::<String, _>("fund_id")))
            .collect()
    }

    /// Fund ids for every owner, grouped by owner id.
    pub async fn all(&self, pool: &SqlitePool) -> DbResult<HashMap<Uuid, Vec<Uuid>>> {
        let sql = format!(
            "SELECT {owner} AS owner_id, fund_id FROM {table} ORDER BY {owner}, fund_id",
            owner = self.owner_column,
            table = self.table
        );
        let rows = sqlx::query(&sql).fetch_all(pool).await?;

        let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in rows {
            let owner_id = parse_uuid(&row.get::<String, _>("owner_id"))?;
            let fund_id = parse_uuid(&row.get::<String, _>("fund_id"))?;
            grouped.entry(owner_id).or_default().push(fund_id);
        }
        Ok(grouped)
    }
}
