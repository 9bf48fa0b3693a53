//! Session and authorization gate.
//!
//! Every request outside the configured exclusions passes through
//! [`session_gate_middleware`], which
//!
//! 1. refreshes the session cookie against the identity provider,
//! 2. classifies the path into a [`Zone`],
//! 3. loads the caller's profile when the zone needs it,
//! 4. [`decide`]s whether to let the request through or redirect it.
//!
//! Cookie changes from step 1 are applied whether or not the request is
//! redirected. The gate keeps no state between requests.

mod decision;
mod profile;
mod refresher;
mod zone;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
pub use decision::{Destination, GateDecision, decide};
pub use profile::lookup_profile;
pub use refresher::{RefreshOutcome, SessionRefresher};
use tower_cookies::Cookies;
pub use zone::Zone;

use crate::{
    AppState,
    auth::{ProviderUser, SessionCookie},
    models::UserProfile,
    observability::metrics,
};

/// Per-request authentication state, inserted as a request extension for
/// requests the gate lets through.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session: Option<SessionCookie>,
    pub subject: Option<ProviderUser>,
    /// Loaded only for login, portal and admin paths.
    pub profile: Option<UserProfile>,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.subject.is_some()
    }
}

pub async fn session_gate_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    if state.config.gate.is_excluded(&path) {
        return next.run(req).await;
    }

    let session_config = &state.config.session;
    let inbound = cookies
        .get(&session_config.cookie_name)
        .map(|c| c.value().to_owned());

    let refreshed = state.refresher.refresh(inbound.as_deref(), Utc::now()).await;
    for mutation in &refreshed.mutations {
        mutation.apply(&cookies, session_config);
    }

    let zone = Zone::classify(&path);
    let profile = match (&refreshed.subject, zone.needs_profile()) {
        (Some(subject), true) => lookup_profile(&state.db, subject.id).await,
        _ => None,
    };

    let decision = decide(
        zone,
        refreshed.subject.is_some(),
        profile.as_ref().map(|p| p.role),
    );
    tracing::debug!(
        zone = zone.as_str(),
        outcome = decision.as_str(),
        "Gate decision"
    );
    metrics::record_gate_decision(zone.as_str(), decision.as_str());

    match decision {
        GateDecision::Allow => {
            req.extensions_mut().insert(SessionContext {
                session: refreshed.session,
                subject: refreshed.subject,
                profile,
            });
            next.run(req).await
        }
        GateDecision::Redirect(destination) => {
            Redirect::temporary(destination.path()).into_response()
        }
    }
}
