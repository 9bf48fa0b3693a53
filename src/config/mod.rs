//! Configuration module for the LP portal.
//!
//! The portal is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [database]
//! type = "sqlite"
//! path = "lp-portal.db"
//!
//! [identity]
//! url = "https://project.supabase.co"
//! api_key = "${IDENTITY_API_KEY}"
//! ```

mod database;
mod gate;
mod identity;
mod observability;
mod server;
mod session;

use std::path::Path;

pub use database::*;
pub use gate::*;
pub use identity::*;
pub use observability::*;
use serde::{Deserialize, Serialize};
pub use server::*;
pub use session::*;

/// Root configuration for the LP portal.
///
/// `database` and `identity` are required; every other section has
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration for persistent storage.
    pub database: DatabaseConfig,

    /// Identity provider connection.
    pub identity: IdentityConfig,

    /// Session cookie settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Session gate settings.
    #[serde(default)]
    pub gate: GateConfig,

    /// Observability configuration (logging, metrics).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing required variables will cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let config: AppConfig = toml::from_str(&expanded).map_err(ConfigError::Parse)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for consistency and completeness.
    fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.identity.validate()?;
        self.session.validate()?;

        if !self.observability.metrics.prometheus.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "observability.metrics.prometheus.path must start with '/'".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Starter configuration written by `lp-portal init`.
pub const STARTER_CONFIG: &str = r#"# LP portal configuration

[server]
host = "127.0.0.1"
port = 8080
# public_url = "https://portal.example.com"

[database]
type = "sqlite"
path = "lp-portal.db"

# Identity provider (GoTrue-compatible). Both values are required.
[identity]
url = "${IDENTITY_URL}"
api_key = "${IDENTITY_API_KEY}"
# Needed to delete LPs that have completed account setup
# service_role_key = "${IDENTITY_SERVICE_ROLE_KEY}"

[session]
# Set to false only for local development over plain HTTP
secure = true

[observability.logging]
level = "info"
format = "compact"
"#;

/// Expand `${VAR}` references from the environment, skipping anything after
/// a `#` on the same line.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    static ENV_VAR: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
        regex::Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid")
    });

    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');

        let mut line_result = String::with_capacity(line.len());
        let mut last_end = 0;

        for cap in ENV_VAR.captures_iter(line) {
            let Some(whole) = cap.get(0) else { continue };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            line_result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            line_result.push_str(&value);

            last_end = whole.end();
        }

        line_result.push_str(&line[last_end..]);
        result.push_str(&line_result);
        result.push('\n');
    }

    // Remove trailing newline if input didn't have one
    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const MINIMAL: &str = r#"
        [database]
        type = "sqlite"
        path = "portal.db"

        [identity]
        url = "https://id.example.com"
        api_key = "anon-key"
    "#;

    #[test]
    fn test_minimal_config() {
        let config = AppConfig::from_str(MINIMAL).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.body_limit_bytes, 1024 * 1024);
        assert_eq!(config.session.cookie_name, "lp_portal_session");
        assert_eq!(config.session.refresh_margin_secs, 60);
        assert_eq!(config.session.max_age_secs, 604800);
        assert!(config.session.secure);
        assert_eq!(config.gate.excluded_paths.len(), 5);
        assert_eq!(config.identity.timeout_secs, 10);
        assert!(config.identity.service_role_key.is_none());
        let DatabaseConfig::Sqlite(sqlite) = &config.database;
        assert!(sqlite.run_migrations);
        assert_eq!(sqlite.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_missing_identity_section_fails() {
        let result = AppConfig::from_str(
            r#"
            [database]
            type = "sqlite"
            path = "portal.db"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_identity_url_fails() {
        let result = AppConfig::from_str(&MINIMAL.replace("https://id.example.com", ""));
        assert!(
            matches!(result, Err(ConfigError::Validation(msg)) if msg.contains("identity.url"))
        );
    }

    #[test]
    fn test_invalid_identity_url_fails() {
        let result = AppConfig::from_str(&MINIMAL.replace("https://id.example.com", "not a url"));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_api_key_fails() {
        let result = AppConfig::from_str(&MINIMAL.replace("anon-key", "  "));
        assert!(
            matches!(result, Err(ConfigError::Validation(msg)) if msg.contains("identity.api_key"))
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = AppConfig::from_str(&format!("{MINIMAL}\n[gate]\nbogus = true\n"));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_same_site_none_requires_secure() {
        let result = AppConfig::from_str(&format!(
            "{MINIMAL}\n[session]\nsecure = false\nsame_site = \"none\"\n"
        ));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_session_overrides() {
        let config = AppConfig::from_str(&format!(
            "{MINIMAL}\n[session]\ncookie_name = \"sid\"\nsecure = false\nsame_site = \"strict\"\n"
        ))
        .unwrap();
        assert_eq!(config.session.cookie_name, "sid");
        assert_eq!(config.session.code_verifier_cookie_name(), "sid-code-verifier");
        assert_eq!(config.session.same_site, SameSiteMode::Strict);
    }

    #[test]
    #[serial]
    fn test_identity_from_env() {
        temp_env::with_vars(
            [
                ("TEST_IDENTITY_URL", Some("https://auth.example.com")),
                ("TEST_IDENTITY_KEY", Some("secret-anon")),
            ],
            || {
                let config = AppConfig::from_str(
                    r#"
                    [database]
                    type = "sqlite"
                    path = "portal.db"

                    [identity]
                    url = "${TEST_IDENTITY_URL}"
                    api_key = "${TEST_IDENTITY_KEY}"
                "#,
                )
                .unwrap();
                assert_eq!(config.identity.url, "https://auth.example.com");
                assert_eq!(config.identity.api_key, "secret-anon");
            },
        );
    }

    #[test]
    #[serial]
    fn test_missing_env_var_fails() {
        temp_env::with_var_unset("TEST_IDENTITY_MISSING", || {
            let result = AppConfig::from_str(
                &MINIMAL.replace("anon-key", "${TEST_IDENTITY_MISSING}"),
            );
            assert!(
                matches!(result, Err(ConfigError::EnvVarNotFound(name)) if name == "TEST_IDENTITY_MISSING")
            );
        });
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("TEST_API_KEY", Some("sk-secret"), || {
            let result = expand_env_vars("key = \"${TEST_API_KEY}\"").unwrap();
            assert_eq!(result, "key = \"sk-secret\"");
        });
    }

    #[test]
    fn test_env_var_in_comment_ignored() {
        let result = expand_env_vars("# api_key = \"${NONEXISTENT_VAR}\"").unwrap();
        assert_eq!(result, "# api_key = \"${NONEXISTENT_VAR}\"");
    }

    #[test]
    fn test_env_var_after_comment_ignored() {
        let result = expand_env_vars("key = \"value\" # ${NONEXISTENT_VAR}").unwrap();
        assert_eq!(result, "key = \"value\" # ${NONEXISTENT_VAR}");
    }

    #[test]
    #[serial]
    fn test_starter_config_parses() {
        temp_env::with_vars(
            [
                ("IDENTITY_URL", Some("https://auth.example.com")),
                ("IDENTITY_API_KEY", Some("anon")),
            ],
            || {
                let config = AppConfig::from_str(STARTER_CONFIG).unwrap();
                assert_eq!(config.server.port, 8080);
            },
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lp-portal.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.identity.url, "https://id.example.com");
    }

    #[test]
    fn test_from_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(&err, ConfigError::Io(_, p) if p == &path));
        assert!(err.to_string().contains("absent.toml"));
    }
}
