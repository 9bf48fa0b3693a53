mod error;
pub mod repos;
pub mod sqlite;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    users: Arc<dyn UserRepo>,
    allowed_lps: Arc<dyn AllowedLpRepo>,
    funds: Arc<dyn FundRepo>,
    companies: Arc<dyn CompanyRepo>,
    investments: Arc<dyn InvestmentRepo>,
    fund_metrics: Arc<dyn FundMetricsRepo>,
    updates: Arc<dyn UpdateRepo>,
}

impl CachedRepos {
    fn sqlite(pool: &sqlx::SqlitePool) -> Self {
        Self {
            users: Arc::new(sqlite::SqliteUserRepo::new(pool.clone())),
            allowed_lps: Arc::new(sqlite::SqliteAllowedLpRepo::new(pool.clone())),
            funds: Arc::new(sqlite::SqliteFundRepo::new(pool.clone())),
            companies: Arc::new(sqlite::SqliteCompanyRepo::new(pool.clone())),
            investments: Arc::new(sqlite::SqliteInvestmentRepo::new(pool.clone())),
            fund_metrics: Arc::new(sqlite::SqliteFundMetricsRepo::new(pool.clone())),
            updates: Arc::new(sqlite::SqliteUpdateRepo::new(pool.clone())),
        }
    }
}

/// Database pool holding the portal's relational store.
///
/// Repositories are cached at construction time to avoid allocation on each access.
pub struct DbPool {
    pool: sqlx::SqlitePool,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos::sqlite(&pool);
        Self { pool, repos }
    }

    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::Sqlite(cfg) => {
                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .connect_with(
                        sqlx::sqlite::SqliteConnectOptions::new()
                            .filename(&cfg.path)
                            .create_if_missing(cfg.create_if_missing)
                            .foreign_keys(true)
                            .journal_mode(if cfg.wal_mode {
                                sqlx::sqlite::SqliteJournalMode::Wal
                            } else {
                                sqlx::sqlite::SqliteJournalMode::Delete
                            })
                            .busy_timeout(std::time::Duration::from_millis(cfg.busy_timeout_ms)),
                    )
                    .await?;

                Ok(Self::from_sqlite(pool))
            }
        }
    }

    /// Whether the configured database asks for migrations at startup.
    pub fn should_run_migrations(config: &DatabaseConfig) -> bool {
        match config {
            DatabaseConfig::Sqlite(cfg) => cfg.run_migrations,
        }
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        tracing::info!("Running SQLite migrations");
        sqlx::migrate!("./migrations_sqlx/sqlite")
            .run(&self.pool)
            .await?;
        tracing::info!("SQLite migrations completed successfully");
        Ok(())
    }

    pub fn users(&self) -> Arc<dyn UserRepo> {
        Arc::clone(&self.repos.users)
    }

    pub fn allowed_lps(&self) -> Arc<dyn AllowedLpRepo> {
        Arc::clone(&self.repos.allowed_lps)
    }

    pub fn funds(&self) -> Arc<dyn FundRepo> {
        Arc::clone(&self.repos.funds)
    }

    pub fn companies(&self) -> Arc<dyn CompanyRepo> {
        Arc::clone(&self.repos.companies)
    }

    pub fn investments(&self) -> Arc<dyn InvestmentRepo> {
        Arc::clone(&self.repos.investments)
    }

    pub fn fund_metrics(&self) -> Arc<dyn FundMetricsRepo> {
        Arc::clone(&self.repos.fund_metrics)
    }

    pub fn updates(&self) -> Arc<dyn UpdateRepo> {
        Arc::clone(&self.repos.updates)
    }

    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
