use std::sync::Arc;

use crate::{
    db::{DbPool, DbResult},
    models::{CreateFund, Fund},
};

#[derive(Clone)]
pub struct FundService {
    db: Arc<DbPool>,
}

impl FundService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// List all funds ordered by slug
    pub async fn list(&self) -> DbResult<Vec<Fund>> {
        self.db.funds().list().await
    }

    pub async fn create(&self, input: CreateFund) -> DbResult<Fund> {
        self.db.funds().create(input).await
    }
}
