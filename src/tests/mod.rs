//! Shared test support: an in-process identity provider and a full router
//! wired to an in-memory database.

mod portal_e2e;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use chrono::Utc;
use tower::ServiceExt;
use tower_cookies::cookie::Cookie;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{IdentityError, IdentityProvider, ProviderSession, ProviderUser, SessionCookie},
    build_app,
    config::AppConfig,
    db::{DbPool, tests::RepoTestContext},
    models::{CreateUserProfile, Role, normalize_email},
};

/// A link the fake provider was asked to email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentLink {
    pub kind: &'static str,
    pub email: String,
    pub redirect_to: String,
    pub code_challenge: String,
}

#[derive(Default)]
struct FakeState {
    access_tokens: HashMap<String, ProviderUser>,
    refresh_tokens: HashMap<String, ProviderUser>,
    codes: HashMap<String, ProviderUser>,
    passwords: HashMap<String, (String, ProviderUser)>,
    unavailable: bool,
    next_token: u64,
    calls: Vec<&'static str>,
    updated_passwords: Vec<(Uuid, String)>,
    deleted_users: Vec<Uuid>,
    sent_links: Vec<SentLink>,
}

impl FakeState {
    fn issue(&mut self, user: &ProviderUser, ttl_secs: i64) -> ProviderSession {
        self.next_token += 1;
        let access_token = format!("access-{}", self.next_token);
        let refresh_token = format!("refresh-{}", self.next_token);
        self.access_tokens
            .insert(access_token.clone(), user.clone());
        self.refresh_tokens
            .insert(refresh_token.clone(), user.clone());

        ProviderSession {
            access_token,
            refresh_token,
            expires_at: Utc::now().timestamp() + ttl_secs,
            user: user.clone(),
        }
    }
}

fn rejected(status: u16, message: &str) -> IdentityError {
    IdentityError::Rejected {
        status,
        message: message.to_string(),
    }
}

/// In-memory identity provider. Unknown tokens, codes and credentials are
/// rejected the way the real service rejects them.
#[derive(Default)]
pub struct FakeIdentityProvider {
    state: Mutex<FakeState>,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Record a call and fail it if the provider is marked unavailable.
    fn enter(&self, operation: &'static str) -> Result<MutexGuard<'_, FakeState>, IdentityError> {
        let mut state = self.lock();
        state.calls.push(operation);
        if state.unavailable {
            return Err(IdentityError::Unavailable("connection refused".into()));
        }
        Ok(state)
    }

    /// Issue a session valid for an hour.
    pub fn issue_session(&self, user: &ProviderUser) -> ProviderSession {
        self.lock().issue(user, 3600)
    }

    /// Issue a session inside the refresh margin.
    pub fn issue_expiring_session(&self, user: &ProviderUser) -> ProviderSession {
        self.lock().issue(user, 10)
    }

    /// Make `code` exchangeable for a session for `user`.
    pub fn add_code(&self, code: &str, user: &ProviderUser) {
        self.lock().codes.insert(code.to_string(), user.clone());
    }

    pub fn add_password(&self, user: &ProviderUser, password: &str) {
        self.lock().passwords.insert(
            normalize_email(&user.email),
            (password.to_string(), user.clone()),
        );
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn updated_passwords(&self) -> Vec<(Uuid, String)> {
        self.lock().updated_passwords.clone()
    }

    pub fn deleted_users(&self) -> Vec<Uuid> {
        self.lock().deleted_users.clone()
    }

    pub fn sent_links(&self) -> Vec<SentLink> {
        self.lock().sent_links.clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<ProviderSession, IdentityError> {
        let mut state = self.enter("exchange_code")?;
        if code_verifier.is_empty() {
            return Err(rejected(400, "code verifier required"));
        }
        let user = state
            .codes
            .remove(auth_code)
            .ok_or_else(|| rejected(404, "invalid flow state"))?;
        Ok(state.issue(&user, 3600))
    }

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, IdentityError> {
        let state = self.enter("get_user")?;
        state
            .access_tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| rejected(401, "invalid JWT"))
    }

    async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<ProviderSession, IdentityError> {
        let mut state = self.enter("refresh_session")?;
        let user = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| rejected(400, "Invalid Refresh Token"))?;
        Ok(state.issue(&user, 3600))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, IdentityError> {
        let mut state = self.enter("sign_in_with_password")?;
        let user = match state.passwords.get(&normalize_email(email)) {
            Some((stored, user)) if stored == password => user.clone(),
            _ => return Err(rejected(400, "Invalid login credentials")),
        };
        Ok(state.issue(&user, 3600))
    }

    async fn send_login_link(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), IdentityError> {
        let mut state = self.enter("send_login_link")?;
        state.sent_links.push(SentLink {
            kind: "login",
            email: email.to_string(),
            redirect_to: redirect_to.to_string(),
            code_challenge: code_challenge.to_string(),
        });
        Ok(())
    }

    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<(), IdentityError> {
        let mut state = self.enter("send_password_reset")?;
        state.sent_links.push(SentLink {
            kind: "recovery",
            email: email.to_string(),
            redirect_to: redirect_to.to_string(),
            code_challenge: code_challenge.to_string(),
        });
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        let mut state = self.enter("update_password")?;
        let user = state
            .access_tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| rejected(401, "invalid JWT"))?;
        state
            .passwords
            .insert(normalize_email(&user.email), (password.to_string(), user.clone()));
        state.updated_passwords.push((user.id, password.to_string()));
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) {
        if let Ok(mut state) = self.enter("sign_out") {
            state.access_tokens.remove(access_token);
        }
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), IdentityError> {
        let mut state = self.enter("delete_user")?;
        state.deleted_users.push(user_id);
        Ok(())
    }
}

pub const TEST_CONFIG: &str = r#"
[database]
type = "sqlite"
path = ":memory:"

[identity]
url = "https://id.example.com"
api_key = "anon-key"
"#;

/// Full router over an in-memory database and a [`FakeIdentityProvider`].
pub struct TestApp {
    pub router: Router,
    pub config: AppConfig,
    pub db: Arc<DbPool>,
    pub identity: Arc<FakeIdentityProvider>,
    pub ctx: RepoTestContext,
}

impl TestApp {
    pub async fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let config = AppConfig::from_str(TEST_CONFIG).unwrap();
        let ctx = RepoTestContext::sqlite().await;
        let identity = Arc::new(FakeIdentityProvider::new());
        let state = AppState::from_parts(config.clone(), ctx.db.clone(), identity.clone());

        Self {
            router: build_app(&config, state),
            config,
            db: ctx.db.clone(),
            identity,
            ctx,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// `Cookie` header value carrying `session`.
    pub fn cookie_for(&self, session: &ProviderSession) -> String {
        format!(
            "{}={}",
            self.config.session.cookie_name,
            SessionCookie::from(session).encode()
        )
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// An identity with a live session but no profile yet.
    pub fn identity_user(&self, email: &str) -> (ProviderUser, ProviderSession) {
        let user = ProviderUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        let session = self.identity.issue_session(&user);
        (user, session)
    }

    /// An onboarded LP granted `fund_ids`, with a live session.
    pub async fn lp_user(&self, email: &str, fund_ids: Vec<Uuid>) -> (ProviderUser, ProviderSession) {
        let lp = self.ctx.create_test_lp(email, fund_ids).await;
        let (user, session) = self.identity_user(email);
        self.db
            .users()
            .create(CreateUserProfile {
                id: user.id,
                email: email.to_string(),
                allowed_lp_id: Some(lp),
                role: Role::Lp,
            })
            .await
            .unwrap();
        (user, session)
    }

    pub async fn admin_user(&self, email: &str) -> (ProviderUser, ProviderSession) {
        let (user, session) = self.identity_user(email);
        self.db
            .users()
            .create(CreateUserProfile {
                id: user.id,
                email: email.to_string(),
                allowed_lp_id: None,
                role: Role::Admin,
            })
            .await
            .unwrap();
        (user, session)
    }
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Cookies set by a response, keyed by name.
pub fn set_cookies(response: &Response<Body>) -> HashMap<String, Cookie<'static>> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v.to_string()).ok())
        .map(|c| (c.name().to_string(), c))
        .collect()
}

pub fn assert_redirect(response: &Response<Body>, status: StatusCode, to: &str) {
    assert_eq!(response.status(), status);
    assert_eq!(location(response), Some(to));
}
