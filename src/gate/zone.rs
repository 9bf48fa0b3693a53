/// Classification bucket for a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Root,
    AuthCallback,
    AuthSetupOrReset,
    Login,
    Portal,
    Admin,
    Other,
}

impl Zone {
    /// Classify a request path. Exact matches win over prefix matches.
    pub fn classify(path: &str) -> Self {
        match path {
            "/" => return Self::Root,
            "/auth/callback" => return Self::AuthCallback,
            "/auth/setup-password" | "/auth/reset-password" => return Self::AuthSetupOrReset,
            "/login" => return Self::Login,
            _ => {}
        }

        if path.starts_with("/portal") {
            Self::Portal
        } else if path.starts_with("/admin") {
            Self::Admin
        } else {
            Self::Other
        }
    }

    /// Whether the gate needs the caller's profile to decide this zone.
    pub fn needs_profile(&self) -> bool {
        matches!(self, Self::Login | Self::Portal | Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::AuthCallback => "auth_callback",
            Self::AuthSetupOrReset => "auth_setup_or_reset",
            Self::Login => "login",
            Self::Portal => "portal",
            Self::Admin => "admin",
            Self::Other => "other",
        }
    }
}
