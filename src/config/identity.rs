use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Identity provider connection settings.
///
/// The provider is a GoTrue-compatible auth service. `url` and `api_key`
/// are required; the portal refuses to start without them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Base URL of the provider project (e.g., "https://xyz.supabase.co").
    #[serde(default)]
    pub url: String,

    /// Public (anon) API key sent with every request.
    #[serde(default)]
    pub api_key: String,

    /// Privileged key used for user deletion. Optional; deleting an LP that
    /// has completed setup fails without it.
    #[serde(default)]
    pub service_role_key: Option<String>,

    /// Timeout for identity calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl IdentityConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "identity.url is required".into(),
            ));
        }
        url::Url::parse(&self.url).map_err(|e| {
            ConfigError::Validation(format!("identity.url is not a valid URL: {e}"))
        })?;
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "identity.api_key is required".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "identity.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    10
}
