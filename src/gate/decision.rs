use super::Zone;
use crate::models::Role;

/// Where a redirected request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Login,
    Portal,
    Admin,
    SetupPassword,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Portal => "/portal",
            Self::Admin => "/admin",
            Self::SetupPassword => "/auth/setup-password",
        }
    }

    /// Landing page for a signed-in profile.
    pub fn home_for(role: Role) -> Self {
        if role.is_admin() { Self::Admin } else { Self::Portal }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(Destination),
}

impl GateDecision {
    /// Label for the `outcome` dimension of gate metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Redirect(Destination::Login) => "redirect_login",
            Self::Redirect(Destination::Portal) => "redirect_portal",
            Self::Redirect(Destination::Admin) => "redirect_admin",
            Self::Redirect(Destination::SetupPassword) => "redirect_setup_password",
        }
    }
}

/// Decide access for a request.
///
/// `role` is `None` when the caller has no profile. A session without a
/// profile is mid-setup and never reaches content.
pub fn decide(zone: Zone, has_session: bool, role: Option<Role>) -> GateDecision {
    use Destination::*;
    use GateDecision::*;

    match zone {
        Zone::Root => Redirect(Login),
        Zone::AuthCallback => Allow,
        Zone::AuthSetupOrReset => {
            if has_session {
                Allow
            } else {
                Redirect(Login)
            }
        }
        Zone::Login => match (has_session, role) {
            (false, _) => Allow,
            (true, Some(role)) => Redirect(Destination::home_for(role)),
            (true, None) => Redirect(SetupPassword),
        },
        Zone::Portal | Zone::Admin => match (has_session, role) {
            (false, _) => Redirect(Login),
            (true, None) => Redirect(SetupPassword),
            (true, Some(role)) if zone == Zone::Admin && !role.is_admin() => Redirect(Portal),
            (true, Some(_)) => Allow,
        },
        Zone::Other => Allow,
    }
}
