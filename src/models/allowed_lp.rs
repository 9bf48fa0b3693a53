use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{EditableField, FieldKind};

/// Allow-list entry permitting an external party to complete account setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllowedLp {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub organization: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Allow-list entry with its fund grants and linked profile activity.
#[derive(Debug, Clone, Serialize)]
pub struct AllowedLpWithAccess {
    #[serde(flatten)]
    pub lp: AllowedLp,
    pub fund_ids: Vec<Uuid>,
    /// Last login of the linked user profile, if the LP has completed setup.
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAllowedLp {
    #[validate(email, length(max = 320))]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub organization: Option<String>,
    /// Funds this LP can see in the portal
    #[serde(default)]
    pub fund_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetFunds {
    #[serde(default)]
    pub fund_ids: Vec<Uuid>,
}

/// Inline-editable columns of an allow-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedLpField {
    Name,
    Organization,
}

impl EditableField for AllowedLpField {
    fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Organization => "organization",
        }
    }

    fn kind(&self) -> FieldKind {
        FieldKind::Text
    }

    fn required(&self) -> bool {
        matches!(self, Self::Name)
    }
}
