//! Security headers middleware.
//!
//! Adds standard security headers to all responses to protect against
//! clickjacking and MIME-sniffing, plus HSTS on secure connections.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    config::{HstsConfig, SecurityHeadersConfig},
};

/// Middleware that adds security headers to all responses.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let config = &state.config.server.security_headers;
    if !config.enabled {
        return next.run(request).await;
    }

    let is_secure = is_secure_connection(&request)
        || state
            .config
            .server
            .public_url
            .as_deref()
            .is_some_and(|url| url.starts_with("https://"));

    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut(), config, is_secure);
    response
}

fn apply_security_headers(headers: &mut HeaderMap, config: &SecurityHeadersConfig, is_secure: bool) {
    if let Some(value) = try_header_value(&config.content_type_options) {
        headers.insert("x-content-type-options", value);
    }

    if let Some(value) = config.frame_options.as_deref().and_then(try_header_value) {
        headers.insert("x-frame-options", value);
    }

    // HSTS is meaningless over plain HTTP
    if config.hsts.enabled
        && is_secure
        && let Some(value) = try_header_value(&build_hsts_header(&config.hsts))
    {
        headers.insert("strict-transport-security", value);
    }

    if let Some(value) = config
        .content_security_policy
        .as_deref()
        .and_then(try_header_value)
    {
        headers.insert("content-security-policy", value);
    }

    if let Some(value) = config.referrer_policy.as_deref().and_then(try_header_value) {
        headers.insert("referrer-policy", value);
    }
}

/// Convert a string to a header value, returning None if empty or invalid.
fn try_header_value(s: &str) -> Option<HeaderValue> {
    if s.is_empty() {
        return None;
    }
    HeaderValue::try_from(s).ok()
}

fn build_hsts_header(config: &HstsConfig) -> String {
    let mut parts = vec![format!("max-age={}", config.max_age_secs)];
    if config.include_subdomains {
        parts.push("includeSubDomains".to_string());
    }
    if config.preload {
        parts.push("preload".to_string());
    }
    parts.join("; ")
}

/// Whether the request arrived over HTTPS, directly or via a reverse proxy.
fn is_secure_connection<B>(request: &Request<B>) -> bool {
    let forwarded_https = request
        .headers()
        .get("x-forwarded-proto")
        .is_some_and(|proto| proto.as_bytes().eq_ignore_ascii_case(b"https"));

    let scheme_https = request
        .uri()
        .scheme_str()
        .is_some_and(|s| s.eq_ignore_ascii_case("https"));

    forwarded_https || scheme_https
}
