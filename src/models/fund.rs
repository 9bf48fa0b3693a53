use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validators::SLUG_REGEX;

db_enum! {
    pub enum FundStatus {
        Active => "active",
        Closed => "closed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fund {
    pub id: Uuid,
    pub name: String,
    /// URL-friendly identifier used to select a fund in the portal
    pub slug: String,
    pub start_date: Option<NaiveDate>,
    pub status: FundStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFund {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64), regex(path = *SLUG_REGEX))]
    pub slug: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default = "default_fund_status")]
    pub status: FundStatus,
}

/// `?fund=slug` selector on portal views.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundQuery {
    pub fund: Option<String>,
}

fn default_fund_status() -> FundStatus {
    FundStatus::Active
}
