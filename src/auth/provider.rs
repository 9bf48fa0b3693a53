use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::IdentityError;

/// Subject of an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
}

/// Session issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds at which `access_token` expires.
    pub expires_at: i64,
    pub user: ProviderUser,
}

/// Operations the portal needs from the external identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a PKCE authorization code from an emailed link for a session.
    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<ProviderSession, IdentityError>;

    /// Resolve the subject behind an access token.
    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, IdentityError>;

    async fn refresh_session(&self, refresh_token: &str)
    -> Result<ProviderSession, IdentityError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, IdentityError>;

    /// Email a one-time login link that returns to `redirect_to`.
    async fn send_login_link(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), IdentityError>;

    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), IdentityError>;

    async fn update_password(&self, access_token: &str, password: &str)
    -> Result<(), IdentityError>;

    /// Revoke the session. Failures are logged, never returned.
    async fn sign_out(&self, access_token: &str);

    /// Delete an identity. Requires admin privileges at the provider.
    async fn delete_user(&self, user_id: Uuid) -> Result<(), IdentityError>;
}
