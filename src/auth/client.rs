//! HTTP client for a GoTrue-compatible identity service.
//!
//! All endpoints live under `{url}/auth/v1`. Every request carries the
//! project's public `apikey`; calls made on behalf of a user add that user's
//! access token as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use uuid::Uuid;

use super::{IdentityError, IdentityProvider, ProviderSession, ProviderUser};
use crate::{config::IdentityConfig, observability::metrics};

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: ProviderUser,
}

impl TokenResponse {
    fn into_session(self) -> ProviderSession {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs))
            .unwrap_or_else(|| Utc::now().timestamp());

        ProviderSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Error body shapes returned by GoTrue versions in the wild.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self, status: StatusCode) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| status.to_string())
    }
}

pub struct HttpIdentityProvider {
    base_url: String,
    api_key: String,
    service_role_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: format!("{}/auth/v1", config.url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            service_role_key: config.service_role_key.clone(),
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http_client
            .get(self.endpoint(path))
            .header("apikey", &self.api_key)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http_client
            .post(self.endpoint(path))
            .header("apikey", &self.api_key)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.http_client
            .put(self.endpoint(path))
            .header("apikey", &self.api_key)
    }

    /// Send a request and check its status.
    async fn send(&self, request: RequestBuilder) -> Result<Response, IdentityError> {
        match request.send().await {
            Ok(response) => check_status(response).await,
            Err(e) => Err(IdentityError::Unavailable(e.to_string())),
        }
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<(), IdentityError> {
        let result = self.send(request).await.map(drop);
        record_outcome(operation, &result);
        result
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, IdentityError> {
        let result = match self.send(request).await {
            Ok(response) => response
                .json::<T>()
                .await
                .map_err(|e| IdentityError::InvalidResponse(e.to_string())),
            Err(e) => Err(e),
        };
        record_outcome(operation, &result);
        result
    }

    async fn token_grant(
        &self,
        operation: &'static str,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<ProviderSession, IdentityError> {
        let request = self
            .post("token")
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let tokens: TokenResponse = self.execute_json(operation, request).await?;
        Ok(tokens.into_session())
    }
}

fn record_outcome<T>(operation: &'static str, result: &Result<T, IdentityError>) {
    match result {
        Ok(_) => metrics::record_identity_request(operation, "success"),
        Err(e) => {
            metrics::record_identity_request(operation, e.metric_status());
            tracing::warn!(operation, error = %e, "Identity provider call failed");
        }
    }
}

/// Map a non-success status to an error: 4xx is a rejection, anything else
/// means the provider is unavailable. Timeouts and rate limits are transient
/// and count as unavailable.
async fn check_status(response: Response) -> Result<Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    let message = body.into_message(status);

    let transient = matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
    );
    if status.is_client_error() && !transient {
        Err(IdentityError::Rejected {
            status: status.as_u16(),
            message,
        })
    } else {
        Err(IdentityError::Unavailable(format!("{status}: {message}")))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<ProviderSession, IdentityError> {
        self.token_grant(
            "exchange_code",
            "pkce",
            json!({ "auth_code": auth_code, "code_verifier": code_verifier }),
        )
        .await
    }

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, IdentityError> {
        self.execute_json("get_user", self.get("user").bearer_auth(access_token))
            .await
    }

    async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<ProviderSession, IdentityError> {
        self.token_grant(
            "refresh_session",
            "refresh_token",
            json!({ "refresh_token": refresh_token }),
        )
        .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, IdentityError> {
        self.token_grant(
            "sign_in_with_password",
            "password",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn send_login_link(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), IdentityError> {
        let request = self
            .post("otp")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({
                "email": email,
                "create_user": true,
                "code_challenge": code_challenge,
                "code_challenge_method": "s256",
            }));
        self.execute("send_login_link", request).await
    }

    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), IdentityError> {
        let request = self
            .post("recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({
                "email": email,
                "code_challenge": code_challenge,
                "code_challenge_method": "s256",
            }));
        self.execute("send_password_reset", request).await
    }

    async fn update_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        let request = self
            .put("user")
            .bearer_auth(access_token)
            .json(&json!({ "password": password }));
        self.execute("update_password", request).await
    }

    async fn sign_out(&self, access_token: &str) {
        let request = self.post("logout").bearer_auth(access_token);
        // Failure is already logged; the local cookie is cleared either way
        let _ = self.execute("sign_out", request).await;
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), IdentityError> {
        let service_role_key = self
            .service_role_key
            .as_deref()
            .ok_or(IdentityError::NotConfigured("delete_user"))?;

        let request = self
            .http_client
            .delete(self.endpoint(&format!("admin/users/{user_id}")))
            .header("apikey", service_role_key)
            .bearer_auth(service_role_key);
        self.execute("delete_user", request).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path, query_param},
    };

    use super::*;

    fn provider(server: &MockServer, service_role_key: Option<&str>) -> HttpIdentityProvider {
        HttpIdentityProvider::new(&IdentityConfig {
            url: server.uri(),
            api_key: "anon-key".into(),
            service_role_key: service_role_key.map(String::from),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn token_body(user_id: Uuid) -> serde_json::Value {
        json!({
            "access_token": "new-access",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "refresh_token": "new-refresh",
            "user": { "id": user_id, "email": "lp@example.com", "aud": "authenticated" }
        })
    }

    #[tokio::test]
    async fn test_exchange_code_posts_pkce_grant() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "pkce"))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({ "auth_code": "code-1", "code_verifier": "verifier-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(user_id)))
            .expect(1)
            .mount(&server)
            .await;

        let session = provider(&server, None)
            .exchange_code("code-1", "verifier-1")
            .await
            .unwrap();

        assert_eq!(session.access_token, "new-access");
        assert_eq!(session.refresh_token, "new-refresh");
        assert_eq!(session.expires_at, 1_900_000_000);
        assert_eq!(session.user.id, user_id);
        assert_eq!(session.user.email, "lp@example.com");
    }

    #[tokio::test]
    async fn test_expires_in_used_when_expires_at_missing() {
        let server = MockServer::start().await;
        let mut body = token_body(Uuid::new_v4());
        body.as_object_mut().unwrap().remove("expires_at");

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let before = Utc::now().timestamp();
        let session = provider(&server, None)
            .refresh_session("old-refresh")
            .await
            .unwrap();
        assert!(session.expires_at >= before + 3600);
        assert!(session.expires_at <= Utc::now().timestamp() + 3600);
    }

    #[tokio::test]
    async fn test_get_user_sends_bearer() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer access-1"))
            .and(header("apikey", "anon-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": user_id, "email": "a@example.com" })),
            )
            .mount(&server)
            .await;

        let user = provider(&server, None).get_user("access-1").await.unwrap();
        assert_eq!(user.id, user_id);
    }

    #[tokio::test]
    async fn test_client_error_is_rejected_with_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = provider(&server, None)
            .sign_in_with_password("lp@example.com", "wrong")
            .await
            .unwrap_err();

        match err {
            IdentityError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid login credentials");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = provider(&server, None).get_user("t").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_and_timeout_are_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "code": 429,
                "msg": "Request rate limit reached"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(408))
            .mount(&server)
            .await;

        let client = provider(&server, None);

        let err = client.refresh_session("refresh").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable(_)), "{err:?}");
        let err = client
            .sign_in_with_password("lp@example.com", "Sup3rSecret")
            .await
            .unwrap_err();
        assert!(!err.is_rejected());
        let err = client.get_user("t").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        let server = MockServer::start().await;
        let client = provider(&server, None);
        drop(server);

        let err = client.get_user("t").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = provider(&server, None).get_user("t").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_login_link_carries_redirect_and_challenge() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/otp"))
            .and(query_param("redirect_to", "https://portal.example.com/auth/callback"))
            .and(body_json(json!({
                "email": "lp@example.com",
                "create_user": true,
                "code_challenge": "challenge-1",
                "code_challenge_method": "s256",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        provider(&server, None)
            .send_login_link(
                "lp@example.com",
                "https://portal.example.com/auth/callback",
                "challenge-1",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_password_reset_posts_recover() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/recover"))
            .and(query_param(
                "redirect_to",
                "https://portal.example.com/auth/callback?type=recovery",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        provider(&server, None)
            .send_password_reset(
                "lp@example.com",
                "https://portal.example.com/auth/callback?type=recovery",
                "challenge-1",
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_password_puts_user() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer access-1"))
            .and(body_json(json!({ "password": "N3wPassword" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": Uuid::new_v4() })))
            .expect(1)
            .mount(&server)
            .await;

        provider(&server, None)
            .update_password("access-1", "N3wPassword")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sign_out_swallows_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        provider(&server, None).sign_out("access-1").await;
    }

    #[tokio::test]
    async fn test_delete_user_requires_service_role_key() {
        let server = MockServer::start().await;

        let err = provider(&server, None)
            .delete_user(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_delete_user_uses_service_role_key() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();

        Mock::given(method("DELETE"))
            .and(path(format!("/auth/v1/admin/users/{user_id}")))
            .and(header("authorization", "Bearer service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        provider(&server, Some("service-key"))
            .delete_user(user_id)
            .await
            .unwrap();
    }
}
