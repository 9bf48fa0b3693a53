use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::{IdentityError, IdentityProvider},
    db::{DbError, DbPool, DbResult},
    models::{
        AllowedLp, AllowedLpField, AllowedLpWithAccess, CreateAllowedLp, FieldUpdate,
        parse_field_value,
    },
};

#[derive(Debug, Error)]
pub enum LpServiceError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Allow-list management for the admin console.
#[derive(Clone)]
pub struct LpService {
    db: Arc<DbPool>,
    identity: Arc<dyn IdentityProvider>,
}

impl LpService {
    pub fn new(db: Arc<DbPool>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { db, identity }
    }

    pub async fn list(&self) -> DbResult<Vec<AllowedLpWithAccess>> {
        self.db.allowed_lps().list_with_access().await
    }

    pub async fn create(&self, input: CreateAllowedLp) -> DbResult<AllowedLp> {
        self.db.allowed_lps().create(input).await
    }

    pub async fn update_field(&self, id: Uuid, update: FieldUpdate<AllowedLpField>) -> DbResult<()> {
        let value =
            parse_field_value(update.field, update.value.as_deref()).map_err(DbError::Validation)?;
        self.db
            .allowed_lps()
            .update_field(id, update.field, value)
            .await
    }

    /// Replace the funds the LP can see.
    pub async fn set_funds(&self, id: Uuid, fund_ids: &[Uuid]) -> DbResult<Vec<Uuid>> {
        self.db.allowed_lps().set_funds(id, fund_ids).await?;
        self.db.allowed_lps().fund_ids(id).await
    }

    /// Remove an LP from the allow-list.
    ///
    /// If the LP completed setup, its identity is deleted at the provider
    /// first; the profile and fund grants go with the allow-list row.
    pub async fn delete(&self, id: Uuid) -> Result<(), LpServiceError> {
        if self.db.allowed_lps().get_by_id(id).await?.is_none() {
            return Err(DbError::NotFound.into());
        }

        if let Some(profile) = self.db.users().get_by_allowed_lp(id).await? {
            match self.identity.delete_user(profile.id).await {
                Ok(()) => {}
                // Already gone at the provider
                Err(IdentityError::Rejected { status: 404, .. }) => {
                    tracing::warn!(user_id = %profile.id, "Identity user already deleted");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.db.allowed_lps().delete(id).await?;
        tracing::info!(allowed_lp_id = %id, "Deleted allowed LP");
        Ok(())
    }
}
