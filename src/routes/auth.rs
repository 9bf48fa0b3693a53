//! Sign-in, one-time links and password setup.
//!
//! - `POST /auth/check-email` - What the login form should offer for an email
//! - `POST /auth/magic-link` - Email a one-time sign-in link
//! - `POST /auth/sign-in` - Password sign-in
//! - `POST /auth/password-reset` - Email a password reset link
//! - `GET /auth/callback` - Landing point for emailed links
//! - `GET|POST /auth/setup-password` - First password for a new LP
//! - `GET|POST /auth/reset-password` - New password after a reset link
//! - `POST /auth/sign-out` - End the session
//! - `GET /auth/me` - Current identity and profile

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_valid::Valid;
use serde::Serialize;
use tower_cookies::Cookies;

use super::error::ApiError;
use crate::{
    AppState,
    auth::{
        IdentityError, PkceChallenge, ProviderUser, SessionCookie, code_verifier_cookie,
        expired_cookie, session_cookie,
    },
    gate::{Destination, SessionContext},
    models::{
        CallbackQuery, EmailRequest, Role, SetPasswordRequest, SignInRequest, UserProfile,
        normalize_email,
    },
    services::{EmailStatus, OnboardingError},
};

#[derive(Debug, Serialize)]
pub struct LoginView {
    pub view: &'static str,
    pub check_email: &'static str,
    pub magic_link: &'static str,
    pub sign_in: &'static str,
    pub password_reset: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CheckEmailResponse {
    pub status: EmailStatus,
}

#[derive(Debug, Serialize)]
pub struct LinkSentResponse {
    pub sent: bool,
}

#[derive(Debug, Serialize)]
pub struct PasswordView {
    pub view: &'static str,
    pub email: String,
    pub action: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: ProviderUser,
    pub profile: Option<UserProfile>,
}

/// Base URL for links the identity provider sends back to us.
fn link_base(state: &AppState, headers: &HeaderMap) -> String {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    state.config.server.base_url(origin)
}

/// Start a PKCE flow and park the verifier in a cookie until the callback.
fn begin_pkce(state: &AppState, cookies: &Cookies) -> PkceChallenge {
    let pkce = PkceChallenge::new();
    cookies.add(code_verifier_cookie(
        &state.config.session,
        &pkce.code_verifier,
    ));
    pkce
}

fn current_session(ctx: &SessionContext) -> Result<(&SessionCookie, &ProviderUser), ApiError> {
    match (&ctx.session, &ctx.subject) {
        (Some(session), Some(subject)) => Ok((session, subject)),
        _ => Err(ApiError::unauthenticated()),
    }
}

#[tracing::instrument(name = "auth.login_view")]
pub async fn login_view() -> Json<LoginView> {
    Json(LoginView {
        view: "login",
        check_email: "/auth/check-email",
        magic_link: "/auth/magic-link",
        sign_in: "/auth/sign-in",
        password_reset: "/auth/password-reset",
    })
}

#[tracing::instrument(name = "auth.check_email", skip(state, input))]
pub async fn check_email(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<EmailRequest>>,
) -> Result<Json<CheckEmailResponse>, ApiError> {
    let status = state.services.onboarding.check_email(&input.email).await?;
    Ok(Json(CheckEmailResponse { status }))
}

#[tracing::instrument(name = "auth.magic_link", skip(state, cookies, headers, input))]
pub async fn magic_link(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
    Valid(Json(input)): Valid<Json<EmailRequest>>,
) -> Result<Json<LinkSentResponse>, ApiError> {
    let redirect_to = format!("{}/auth/callback", link_base(&state, &headers));
    let pkce = begin_pkce(&state, &cookies);

    state
        .identity
        .send_login_link(
            &normalize_email(&input.email),
            &redirect_to,
            &pkce.code_challenge,
        )
        .await?;

    Ok(Json(LinkSentResponse { sent: true }))
}

#[tracing::instrument(name = "auth.sign_in", skip(state, cookies, input))]
pub async fn sign_in(
    State(state): State<AppState>,
    cookies: Cookies,
    Valid(Json(input)): Valid<Json<SignInRequest>>,
) -> Result<Redirect, ApiError> {
    let (session, role) = state
        .services
        .onboarding
        .sign_in(&input.email, &input.password)
        .await
        .map_err(|e| match e {
            OnboardingError::Identity(IdentityError::Rejected { .. }) => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            other => other.into(),
        })?;

    cookies.add(session_cookie(
        &state.config.session,
        &SessionCookie::from(&session),
    ));

    let home = Destination::home_for(role.unwrap_or(Role::Lp));
    Ok(Redirect::to(home.path()))
}

#[tracing::instrument(name = "auth.password_reset", skip(state, cookies, headers, input))]
pub async fn password_reset(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
    Valid(Json(input)): Valid<Json<EmailRequest>>,
) -> Result<Json<LinkSentResponse>, ApiError> {
    let redirect_to = format!(
        "{}/auth/callback?type=recovery",
        link_base(&state, &headers)
    );
    let pkce = begin_pkce(&state, &cookies);

    state
        .identity
        .send_password_reset(
            &normalize_email(&input.email),
            &redirect_to,
            &pkce.code_challenge,
        )
        .await?;

    Ok(Json(LinkSentResponse { sent: true }))
}

/// Exchange the emailed code for a session.
///
/// Every failure lands on the login page; there is nothing useful to show on
/// an expired or replayed link.
#[tracing::instrument(name = "auth.callback", skip(state, cookies, query))]
pub async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let login = Redirect::to(Destination::Login.path());

    let Some(code) = query.code.as_deref() else {
        return login.into_response();
    };

    let config = &state.config.session;
    let verifier_name = config.code_verifier_cookie_name();
    let Some(verifier) = cookies.get(&verifier_name).map(|c| c.value().to_owned()) else {
        tracing::warn!("Auth callback without a code verifier cookie");
        return login.into_response();
    };

    let session = match state.identity.exchange_code(code, &verifier).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Auth code exchange failed");
            return login.into_response();
        }
    };

    cookies.add(session_cookie(config, &SessionCookie::from(&session)));
    cookies.add(expired_cookie(config, verifier_name));

    tracing::info!(user_id = %session.user.id, recovery = query.is_recovery(), "Auth callback completed");

    if query.is_recovery() {
        Redirect::to("/auth/reset-password").into_response()
    } else {
        Redirect::to(Destination::SetupPassword.path()).into_response()
    }
}

#[tracing::instrument(name = "auth.setup_password_view", skip(ctx))]
pub async fn setup_password_view(
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<PasswordView>, ApiError> {
    let (_, subject) = current_session(&ctx)?;
    Ok(Json(PasswordView {
        view: "setup_password",
        email: subject.email.clone(),
        action: "/auth/setup-password",
    }))
}

#[tracing::instrument(name = "auth.setup_password", skip(state, ctx, input))]
pub async fn setup_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Valid(Json(input)): Valid<Json<SetPasswordRequest>>,
) -> Result<Redirect, ApiError> {
    let (session, subject) = current_session(&ctx)?;

    state
        .services
        .onboarding
        .complete_setup(session, subject, &input.password)
        .await?;

    Ok(Redirect::to(Destination::Portal.path()))
}

#[tracing::instrument(name = "auth.reset_password_view", skip(ctx))]
pub async fn reset_password_view(
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<PasswordView>, ApiError> {
    let (_, subject) = current_session(&ctx)?;
    Ok(Json(PasswordView {
        view: "reset_password",
        email: subject.email.clone(),
        action: "/auth/reset-password",
    }))
}

#[tracing::instrument(name = "auth.reset_password", skip(state, ctx, input))]
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Valid(Json(input)): Valid<Json<SetPasswordRequest>>,
) -> Result<Redirect, ApiError> {
    let (session, _) = current_session(&ctx)?;

    state
        .services
        .onboarding
        .reset_password(session, &input.password)
        .await?;

    Ok(Redirect::to(Destination::Portal.path()))
}

#[tracing::instrument(name = "auth.sign_out", skip(state, cookies, ctx))]
pub async fn sign_out(
    State(state): State<AppState>,
    cookies: Cookies,
    Extension(ctx): Extension<SessionContext>,
) -> Redirect {
    if let Some(session) = &ctx.session {
        state.identity.sign_out(&session.access_token).await;
    }

    let config = &state.config.session;
    cookies.add(expired_cookie(config, config.cookie_name.clone()));

    Redirect::to(Destination::Login.path())
}

#[tracing::instrument(name = "auth.me", skip(state, ctx))]
pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<MeResponse>, ApiError> {
    let subject = ctx.subject.ok_or_else(ApiError::unauthenticated)?;

    let profile = match ctx.profile {
        Some(profile) => Some(profile),
        None => state.db.users().get_by_id(subject.id).await?,
    };

    Ok(Json(MeResponse {
        user: subject,
        profile,
    }))
}
