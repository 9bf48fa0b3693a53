pub mod admin;
pub mod auth;
mod error;
pub mod health;
pub mod portal;

use axum::{
    Router,
    routing::{get, post},
};
pub use error::{ApiError, ErrorInfo, ErrorResponse};

use crate::AppState;

/// Login page and the `/auth/*` actions.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_view))
        .route("/auth/check-email", post(auth::check_email))
        .route("/auth/magic-link", post(auth::magic_link))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/password-reset", post(auth::password_reset))
        .route("/auth/callback", get(auth::callback))
        .route(
            "/auth/setup-password",
            get(auth::setup_password_view).post(auth::setup_password),
        )
        .route(
            "/auth/reset-password",
            get(auth::reset_password_view).post(auth::reset_password),
        )
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/auth/me", get(auth::me))
}
