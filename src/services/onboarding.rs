use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::{IdentityError, IdentityProvider, ProviderSession, ProviderUser, SessionCookie},
    db::{DbError, DbPool, DbResult},
    models::{CreateUserProfile, Role, UserProfile, normalize_email},
};

/// What the login form should offer for an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    /// Not on the allow-list; the portal will not let this email in.
    NotAllowed,
    /// Has completed setup and can sign in with a password.
    ExistingUser,
    /// On the allow-list but has not set a password yet.
    NewUser,
}

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("Email not in allow-list")]
    NotAllowListed,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Sign-in and first-time account setup.
#[derive(Clone)]
pub struct OnboardingService {
    db: Arc<DbPool>,
    identity: Arc<dyn IdentityProvider>,
}

impl OnboardingService {
    pub fn new(db: Arc<DbPool>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { db, identity }
    }

    pub async fn check_email(&self, email: &str) -> DbResult<EmailStatus> {
        let email = normalize_email(email);

        if self.db.allowed_lps().get_by_email(&email).await?.is_none() {
            return Ok(EmailStatus::NotAllowed);
        }

        if self.db.users().get_by_email(&email).await?.is_some() {
            Ok(EmailStatus::ExistingUser)
        } else {
            Ok(EmailStatus::NewUser)
        }
    }

    /// Sign in with a password and stamp the profile's last login.
    ///
    /// Returns the profile role, or `None` when the identity has not
    /// finished setup or the stamp could not be written. The gate routes
    /// either case on the next request.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(ProviderSession, Option<Role>), OnboardingError> {
        let session = self
            .identity
            .sign_in_with_password(&normalize_email(email), password)
            .await?;

        let role = match self
            .db
            .users()
            .record_login(session.user.id, Utc::now())
            .await
        {
            Ok(role) => role,
            Err(e) => {
                tracing::warn!(user_id = %session.user.id, error = %e, "Failed to record login");
                None
            }
        };

        Ok((session, role))
    }

    /// Create the LP profile for `subject`.
    ///
    /// The subject's email must be on the allow-list. Calling this again for
    /// a subject that already has a profile returns that profile.
    pub async fn create_profile(
        &self,
        subject: &ProviderUser,
    ) -> Result<UserProfile, OnboardingError> {
        if let Some(existing) = self.db.users().get_by_id(subject.id).await? {
            return Ok(existing);
        }

        let email = normalize_email(&subject.email);
        let allowed = self
            .db
            .allowed_lps()
            .get_by_email(&email)
            .await?
            .ok_or(OnboardingError::NotAllowListed)?;

        let created = self
            .db
            .users()
            .create(CreateUserProfile {
                id: subject.id,
                email,
                allowed_lp_id: Some(allowed.id),
                role: Role::Lp,
            })
            .await;

        match created {
            Ok(profile) => {
                tracing::info!(user_id = %profile.id, allowed_lp_id = %allowed.id, "Created LP profile");
                Ok(profile)
            }
            // A concurrent setup for the same subject won the insert
            Err(DbError::Conflict(msg)) => match self.db.users().get_by_id(subject.id).await? {
                Some(existing) => Ok(existing),
                None => Err(DbError::Conflict(msg).into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Set the first password for a mid-setup session and create its profile.
    ///
    /// The allow-list is checked before the password is changed, so an
    /// identity that is not allowed in never gets a usable password here.
    pub async fn complete_setup(
        &self,
        session: &SessionCookie,
        subject: &ProviderUser,
        password: &str,
    ) -> Result<UserProfile, OnboardingError> {
        let has_profile = self.db.users().get_by_id(subject.id).await?.is_some();
        if !has_profile
            && self
                .db
                .allowed_lps()
                .get_by_email(&normalize_email(&subject.email))
                .await?
                .is_none()
        {
            return Err(OnboardingError::NotAllowListed);
        }

        self.identity
            .update_password(&session.access_token, password)
            .await?;

        self.create_profile(subject).await
    }

    pub async fn reset_password(
        &self,
        session: &SessionCookie,
        password: &str,
    ) -> Result<(), OnboardingError> {
        self.identity
            .update_password(&session.access_token, password)
            .await?;
        Ok(())
    }

    /// Insert an admin profile for an existing identity.
    pub async fn create_admin(&self, id: Uuid, email: &str) -> DbResult<UserProfile> {
        self.db
            .users()
            .create(CreateUserProfile {
                id,
                email: normalize_email(email),
                allowed_lp_id: None,
                role: Role::Admin,
            })
            .await
    }
}
