use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{DbError, DbPool, DbResult},
    models::{CreateInvestment, FieldUpdate, Investment, InvestmentField, parse_field_value},
};

#[derive(Clone)]
pub struct InvestmentService {
    db: Arc<DbPool>,
}

impl InvestmentService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// All investments with company names, newest first
    pub async fn list(&self) -> DbResult<Vec<Investment>> {
        self.db.investments().list().await
    }

    pub async fn create(&self, input: CreateInvestment) -> DbResult<Investment> {
        self.db.investments().create(input).await
    }

    pub async fn update_field(
        &self,
        id: Uuid,
        update: FieldUpdate<InvestmentField>,
    ) -> DbResult<()> {
        let value =
            parse_field_value(update.field, update.value.as_deref()).map_err(DbError::Validation)?;
        self.db
            .investments()
            .update_field(id, update.field, value)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.db.investments().delete(id).await
    }
}
