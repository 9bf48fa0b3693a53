use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validate_password;

/// Authorization role of a user profile.
///
/// Only `admin` grants elevated access; every other stored value is treated as
/// an LP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Lp,
}

impl Role {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Lp => "lp",
        }
    }

    /// Parse from database string. Unknown values collapse to `Lp`.
    pub fn from_db(s: &str) -> Self {
        if s == "admin" { Self::Admin } else { Self::Lp }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application profile for an identity that has completed setup.
///
/// `id` is the identity provider's subject id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub allowed_lp_id: Option<Uuid>,
    pub role: Role,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserProfile {
    pub id: Uuid,
    pub email: String,
    pub allowed_lp_id: Option<Uuid>,
    pub role: Role,
}

/// Body carrying just an email address.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(length(min = 1, max = 320))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1, max = 320))]
    pub email: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

/// New password with confirmation, used by setup and reset.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetPasswordRequest {
    #[validate(length(max = 1024), custom(function = "validate_password"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm: String,
}

/// Query string on the identity provider's redirect back to the portal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl CallbackQuery {
    pub fn is_recovery(&self) -> bool {
        self.kind.as_deref() == Some("recovery")
    }
}
