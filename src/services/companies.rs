use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{DbError, DbPool, DbResult},
    models::{Company, CompanyField, CreateCompany, FieldUpdate, parse_field_value},
};

/// Portfolio company management.
#[derive(Clone)]
pub struct CompanyService {
    db: Arc<DbPool>,
}

impl CompanyService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> DbResult<Vec<Company>> {
        self.db.companies().list().await
    }

    pub async fn create(&self, input: CreateCompany) -> DbResult<Company> {
        self.db.companies().create(input).await
    }

    pub async fn update_field(&self, id: Uuid, update: FieldUpdate<CompanyField>) -> DbResult<()> {
        let value =
            parse_field_value(update.field, update.value.as_deref()).map_err(DbError::Validation)?;
        self.db.companies().update_field(id, update.field, value).await
    }

    pub async fn set_funds(&self, id: Uuid, fund_ids: &[Uuid]) -> DbResult<Company> {
        self.db.companies().set_funds(id, fund_ids).await?;
        self.db
            .companies()
            .get_by_id(id)
            .await?
            .ok_or(DbError::NotFound)
    }

    /// Delete a company that has no investments.
    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        if self.db.companies().count_investments(id).await? > 0 {
            return Err(DbError::Conflict(
                "Cannot delete: this company has investments".to_string(),
            ));
        }
        self.db.companies().delete(id).await
    }
}
