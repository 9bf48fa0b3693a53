use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally visible base URL (e.g., "https://portal.example.com").
    /// Used to build the links sent by the identity provider. When omitted,
    /// the request `Origin` header is used, then `http://localhost:{port}`.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Request body size limit in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Security headers configuration.
    #[serde(default)]
    pub security_headers: SecurityHeadersConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
            body_limit_bytes: default_body_limit(),
            security_headers: SecurityHeadersConfig::default(),
        }
    }
}

impl ServerConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(public_url) = &self.public_url {
            url::Url::parse(public_url).map_err(|e| {
                ConfigError::Validation(format!("server.public_url is not a valid URL: {e}"))
            })?;
        }
        Ok(())
    }

    /// Base URL for links that point back at this server.
    pub fn base_url(&self, origin: Option<&str>) -> String {
        self.public_url
            .as_deref()
            .or(origin)
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MB
}

/// Security headers configuration.
///
/// These headers protect against common web vulnerabilities like clickjacking,
/// MIME-sniffing, and protocol downgrade attacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityHeadersConfig {
    /// Enable security headers.
    #[serde(default = "default_security_headers_enabled")]
    pub enabled: bool,

    /// X-Content-Type-Options header value. Default: "nosniff"
    #[serde(default = "default_content_type_options")]
    pub content_type_options: String,

    /// X-Frame-Options header value. Default: "DENY"
    #[serde(default = "default_frame_options")]
    pub frame_options: Option<String>,

    /// Strict-Transport-Security header configuration.
    /// Only sent when the request arrived over HTTPS.
    #[serde(default)]
    pub hsts: HstsConfig,

    /// Content-Security-Policy header value.
    #[serde(default = "default_csp")]
    pub content_security_policy: Option<String>,

    /// Referrer-Policy header value.
    #[serde(default = "default_referrer_policy")]
    pub referrer_policy: Option<String>,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: default_security_headers_enabled(),
            content_type_options: default_content_type_options(),
            frame_options: default_frame_options(),
            hsts: HstsConfig::default(),
            content_security_policy: default_csp(),
            referrer_policy: default_referrer_policy(),
        }
    }
}

fn default_security_headers_enabled() -> bool {
    true
}

fn default_content_type_options() -> String {
    "nosniff".to_string()
}

fn default_frame_options() -> Option<String> {
    Some("DENY".to_string())
}

fn default_csp() -> Option<String> {
    Some("default-src 'self'; img-src 'self' data:; style-src 'self' 'unsafe-inline'; object-src 'none'; base-uri 'self'; frame-ancestors 'none'".to_string())
}

fn default_referrer_policy() -> Option<String> {
    Some("strict-origin-when-cross-origin".to_string())
}

/// HTTP Strict Transport Security (HSTS) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HstsConfig {
    /// Enable HSTS header.
    #[serde(default = "default_hsts_enabled")]
    pub enabled: bool,

    /// Max age in seconds browsers should remember to only use HTTPS.
    #[serde(default = "default_hsts_max_age")]
    pub max_age_secs: u64,

    /// Include all subdomains in the HSTS policy.
    #[serde(default = "default_hsts_include_subdomains")]
    pub include_subdomains: bool,

    #[serde(default)]
    pub preload: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            enabled: default_hsts_enabled(),
            max_age_secs: default_hsts_max_age(),
            include_subdomains: default_hsts_include_subdomains(),
            preload: false,
        }
    }
}

fn default_hsts_enabled() -> bool {
    true
}

fn default_hsts_max_age() -> u64 {
    31536000 // 1 year
}

fn default_hsts_include_subdomains() -> bool {
    true
}
