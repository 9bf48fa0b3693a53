//! Fund administration console and LP portal.
//!
//! Every request passes through a session gate that renews the identity
//! provider session held in a cookie and routes the caller by role: admins
//! to `/admin`, LPs to `/portal`, identities that have not finished setup to
//! `/auth/setup-password`, and anonymous callers to `/login`.

pub mod auth;
pub mod config;
pub mod db;
pub mod gate;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::{
    auth::{HttpIdentityProvider, IdentityProvider},
    config::AppConfig,
    db::DbPool,
    gate::SessionRefresher,
    services::Services,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<DbPool>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Shared by every request passing the gate.
    pub refresher: SessionRefresher,
    pub services: Services,
}

impl AppState {
    /// Connect to the database, run migrations if configured and build the
    /// identity client.
    pub async fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = DbPool::from_config(&config.database).await?;
        if DbPool::should_run_migrations(&config.database) {
            pool.run_migrations().await?;
        }

        let identity = HttpIdentityProvider::new(&config.identity)?;
        tracing::debug!(
            identity_url = %config.identity.url,
            timeout_secs = config.identity.timeout_secs,
            delete_enabled = config.identity.service_role_key.is_some(),
            "Identity provider configured"
        );

        Ok(Self::from_parts(config, Arc::new(pool), Arc::new(identity)))
    }

    pub fn from_parts(
        config: AppConfig,
        db: Arc<DbPool>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let refresher = SessionRefresher::new(identity.clone(), config.session.refresh_margin_secs);
        let services = Services::new(db.clone(), identity.clone());

        Self {
            config: Arc::new(config),
            db,
            identity,
            refresher,
            services,
        }
    }
}

pub fn build_app(config: &AppConfig, state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/health/live", get(routes::health::liveness))
        .route("/health/ready", get(routes::health::readiness));

    if config.observability.metrics.enabled {
        app = app.route(
            &config.observability.metrics.prometheus.path,
            get(routes::health::metrics),
        );
    }

    app = app
        .merge(routes::auth_routes())
        .merge(routes::admin::admin_routes())
        .merge(routes::portal::portal_routes());

    // The gate reads and writes cookies, so it sits inside the cookie manager
    app.layer(axum::middleware::from_fn_with_state(
        state.clone(),
        gate::session_gate_middleware,
    ))
    .layer(tower_cookies::CookieManagerLayer::new())
    .layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::security_headers_middleware,
    ))
    .layer(axum::middleware::from_fn(middleware::request_id_middleware))
    .layer(TraceLayer::new_for_http())
    .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
    .with_state(state)
}
