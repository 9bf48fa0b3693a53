//! Shared database repository test infrastructure
//!
//! Each repository has a test module (e.g., `companies.rs`) containing shared
//! test functions that take a [`RepoTestContext`], and a `sqlite_tests` module
//! that runs them against an in-memory SQLite database.


use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::DbPool,
    models::{CreateAllowedLp, CreateCompany, CreateFund, FundStatus},
};

/// Test context giving access to every repository of one database.
pub struct RepoTestContext {
    pub db: Arc<DbPool>,
}

impl RepoTestContext {
    pub async fn sqlite() -> Self {
        Self {
            db: Arc::new(harness::create_test_db().await),
        }
    }

    /// Create a test fund and return its ID
    pub async fn create_test_fund(&self, slug: &str) -> Uuid {
        self.db
            .funds()
            .create(CreateFund {
                name: format!("Fund {}", slug),
                slug: slug.to_string(),
                start_date: None,
                status: FundStatus::Active,
            })
            .await
            .expect("Failed to create test fund")
            .id
    }

    /// Create a test allow-list entry granted `fund_ids` and return its ID
    pub async fn create_test_lp(&self, email: &str, fund_ids: Vec<Uuid>) -> Uuid {
        self.db
            .allowed_lps()
            .create(CreateAllowedLp {
                email: email.to_string(),
                name: format!("LP {}", email),
                organization: None,
                fund_ids,
            })
            .await
            .expect("Failed to create test LP")
            .id
    }

    /// Create a test company held by `fund_ids` and return its ID
    pub async fn create_test_company(&self, name: &str, fund_ids: Vec<Uuid>) -> Uuid {
        self.db
            .companies()
            .create(company_input(name, fund_ids))
            .await
            .expect("Failed to create test company")
            .id
    }
}

pub fn company_input(name: &str, fund_ids: Vec<Uuid>) -> CreateCompany {
    CreateCompany {
        name: name.to_string(),
        sector: None,
        location: None,
        status: crate::models::CompanyStatus::Active,
        ownership_percentage: None,
        total_invested: None,
        first_investment_date: None,
        website_url: None,
        description: None,
        fund_ids,
    }
}

/// Generates a `#[tokio::test]` per shared test fn, each with a fresh database.
macro_rules! sqlite_test {
    ($name:ident) => {
        #[tokio::test]
        async fn $name() {
            let ctx = crate::db::tests::RepoTestContext::sqlite().await;
            super::$name(&ctx).await;
        }
    };
}

pub(crate) use sqlite_test;
