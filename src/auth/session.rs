use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies, cookie::time::Duration as CookieDuration};
use uuid::Uuid;

use super::ProviderSession;
use crate::config::SessionConfig;

/// Session state carried in the session cookie.
///
/// Encoded as JSON, then unpadded base64url, so the value is cookie-safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub user_id: Uuid,
}

impl SessionCookie {
    pub fn encode(&self) -> String {
        // Serializing plain strings and integers cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a cookie value. Anything malformed yields `None`.
    pub fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Whether the access token expires within `margin_secs` of `now`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin_secs: u64) -> bool {
        let margin = i64::try_from(margin_secs).unwrap_or(i64::MAX);
        self.expires_at.saturating_sub(now.timestamp()) <= margin
    }
}

impl From<&ProviderSession> for SessionCookie {
    fn from(session: &ProviderSession) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
            user_id: session.user.id,
        }
    }
}

/// Change to the session cookie produced while handling a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieMutation {
    Set(SessionCookie),
    Remove,
}

impl CookieMutation {
    pub fn apply(&self, cookies: &Cookies, config: &SessionConfig) {
        match self {
            Self::Set(session) => cookies.add(session_cookie(config, session)),
            Self::Remove => cookies.add(expired_cookie(config, config.cookie_name.clone())),
        }
    }
}

fn base_cookie(config: &SessionConfig, name: String, value: String, max_age_secs: u64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site.into())
        .max_age(CookieDuration::seconds(
            i64::try_from(max_age_secs).unwrap_or(i64::MAX),
        ))
        .build()
}

/// The session cookie for `session`.
pub fn session_cookie(config: &SessionConfig, session: &SessionCookie) -> Cookie<'static> {
    base_cookie(
        config,
        config.cookie_name.clone(),
        session.encode(),
        config.max_age_secs,
    )
}

/// The short-lived cookie holding a PKCE verifier.
pub fn code_verifier_cookie(config: &SessionConfig, code_verifier: &str) -> Cookie<'static> {
    base_cookie(
        config,
        config.code_verifier_cookie_name(),
        code_verifier.to_string(),
        config.code_verifier_max_age_secs,
    )
}

/// A cookie that clears `name` in the browser.
pub fn expired_cookie(config: &SessionConfig, name: String) -> Cookie<'static> {
    base_cookie(config, name, String::new(), 0)
}
