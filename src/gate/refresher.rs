use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::{CookieMutation, IdentityError, IdentityProvider, ProviderUser, SessionCookie};

/// Result of refreshing the inbound session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Authenticated subject, `None` when the caller is anonymous.
    pub subject: Option<ProviderUser>,
    /// Session state valid for the rest of the request.
    pub session: Option<SessionCookie>,
    /// Cookie changes to write on whatever response is returned.
    pub mutations: Vec<CookieMutation>,
}

impl RefreshOutcome {
    fn anonymous() -> Self {
        Self::default()
    }

    fn anonymous_and_clear() -> Self {
        Self {
            mutations: vec![CookieMutation::Remove],
            ..Self::default()
        }
    }
}

/// Validates the session cookie and renews it when close to expiry.
///
/// Makes at most one identity provider call per request and never fails:
/// any provider trouble leaves the caller anonymous.
#[derive(Clone)]
pub struct SessionRefresher {
    provider: Arc<dyn IdentityProvider>,
    refresh_margin_secs: u64,
}

impl SessionRefresher {
    pub fn new(provider: Arc<dyn IdentityProvider>, refresh_margin_secs: u64) -> Self {
        Self {
            provider,
            refresh_margin_secs,
        }
    }

    pub async fn refresh(&self, cookie: Option<&str>, now: DateTime<Utc>) -> RefreshOutcome {
        let Some(raw) = cookie else {
            return RefreshOutcome::anonymous();
        };

        let Some(session) = SessionCookie::decode(raw) else {
            tracing::debug!("Discarding undecodable session cookie");
            return RefreshOutcome::anonymous_and_clear();
        };

        if session.expires_within(now, self.refresh_margin_secs) {
            return match self.provider.refresh_session(&session.refresh_token).await {
                Ok(renewed) => {
                    let cookie = SessionCookie::from(&renewed);
                    RefreshOutcome {
                        subject: Some(renewed.user),
                        session: Some(cookie.clone()),
                        mutations: vec![CookieMutation::Set(cookie)],
                    }
                }
                Err(e) => Self::degrade(e),
            };
        }

        match self.provider.get_user(&session.access_token).await {
            Ok(user) => RefreshOutcome {
                subject: Some(user),
                session: Some(session),
                mutations: Vec::new(),
            },
            Err(e) => Self::degrade(e),
        }
    }

    /// A rejected token is gone for good; anything else may be transient, so
    /// the cookie survives for the next request.
    fn degrade(error: IdentityError) -> RefreshOutcome {
        if error.is_rejected() {
            RefreshOutcome::anonymous_and_clear()
        } else {
            RefreshOutcome::anonymous()
        }
    }
}
