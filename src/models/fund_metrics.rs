use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{EditableField, FieldKind};

/// Quarterly performance snapshot for a fund.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundMetrics {
    pub id: Uuid,
    pub fund_id: Uuid,
    pub quarter: i64,
    pub year: i64,
    pub as_of_date: Option<NaiveDate>,
    pub tvpi: Option<f64>,
    pub dpi: Option<f64>,
    pub moic: Option<f64>,
    pub irr: Option<f64>,
    pub fund_size: Option<f64>,
    pub capital_called: Option<f64>,
    pub invested_capital: Option<f64>,
    pub capital_distributed: Option<f64>,
    pub dry_powder: Option<f64>,
    pub num_investments: Option<i64>,
    pub primary_investments: Option<i64>,
    pub follow_on_investments: Option<i64>,
    pub median_initial_check: Option<f64>,
    pub median_initial_valuation: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to add an empty quarter row for a fund.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuarter {
    pub fund_id: Uuid,
    #[validate(range(min = 1, max = 4))]
    pub quarter: i64,
    #[validate(range(min = 1900, max = 2200))]
    pub year: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsQuery {
    pub fund_id: Uuid,
}

/// Inline-editable columns of a metrics row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundMetricsField {
    AsOfDate,
    Tvpi,
    Dpi,
    Moic,
    Irr,
    FundSize,
    CapitalCalled,
    InvestedCapital,
    CapitalDistributed,
    DryPowder,
    NumInvestments,
    PrimaryInvestments,
    FollowOnInvestments,
    MedianInitialCheck,
    MedianInitialValuation,
}

impl EditableField for FundMetricsField {
    fn column(&self) -> &'static str {
        match self {
            Self::AsOfDate => "as_of_date",
            Self::Tvpi => "tvpi",
            Self::Dpi => "dpi",
            Self::Moic => "moic",
            Self::Irr => "irr",
            Self::FundSize => "fund_size",
            Self::CapitalCalled => "capital_called",
            Self::InvestedCapital => "invested_capital",
            Self::CapitalDistributed => "capital_distributed",
            Self::DryPowder => "dry_powder",
            Self::NumInvestments => "num_investments",
            Self::PrimaryInvestments => "primary_investments",
            Self::FollowOnInvestments => "follow_on_investments",
            Self::MedianInitialCheck => "median_initial_check",
            Self::MedianInitialValuation => "median_initial_valuation",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            Self::AsOfDate => FieldKind::Date,
            Self::NumInvestments | Self::PrimaryInvestments | Self::FollowOnInvestments => {
                FieldKind::Integer
            }
            _ => FieldKind::Real,
        }
    }
}
