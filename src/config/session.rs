use serde::{Deserialize, Serialize};
use tower_cookies::cookie::SameSite;

use super::ConfigError;

/// Session cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the session cookie. The PKCE verifier cookie is named
    /// `{cookie_name}-code-verifier`.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Set the `Secure` attribute on cookies.
    #[serde(default = "default_true")]
    pub secure: bool,

    #[serde(default)]
    pub same_site: SameSiteMode,

    /// Cookie lifetime in seconds.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Sessions expiring within this many seconds are refreshed.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: u64,

    /// Lifetime of the PKCE verifier cookie in seconds.
    #[serde(default = "default_code_verifier_max_age_secs")]
    pub code_verifier_max_age_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secure: true,
            same_site: SameSiteMode::default(),
            max_age_secs: default_max_age_secs(),
            refresh_margin_secs: default_refresh_margin_secs(),
            code_verifier_max_age_secs: default_code_verifier_max_age_secs(),
        }
    }
}

impl SessionConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        let valid_name = !self.cookie_name.is_empty()
            && self
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_name {
            return Err(ConfigError::Validation(format!(
                "session.cookie_name '{}' must be non-empty ASCII letters, digits, '_' or '-'",
                self.cookie_name
            )));
        }
        if self.same_site == SameSiteMode::None && !self.secure {
            return Err(ConfigError::Validation(
                "session.same_site = \"none\" requires session.secure = true".into(),
            ));
        }
        Ok(())
    }

    /// Name of the cookie holding the PKCE verifier between link request and callback.
    pub fn code_verifier_cookie_name(&self) -> String {
        format!("{}-code-verifier", self.cookie_name)
    }
}

/// SameSite attribute for session cookies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSiteMode {
    Strict,
    #[default]
    Lax,
    None,
}

impl From<SameSiteMode> for SameSite {
    fn from(mode: SameSiteMode) -> Self {
        match mode {
            SameSiteMode::Strict => SameSite::Strict,
            SameSiteMode::Lax => SameSite::Lax,
            SameSiteMode::None => SameSite::None,
        }
    }
}

fn default_cookie_name() -> String {
    "lp_portal_session".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_age_secs() -> u64 {
    7 * 24 * 60 * 60 // 7 days
}

fn default_refresh_margin_secs() -> u64 {
    60
}

fn default_code_verifier_max_age_secs() -> u64 {
    600
}
