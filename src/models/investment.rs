use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{EditableField, FieldKind};

db_enum! {
    pub enum InvestmentType {
        Safe => "safe",
        Equity => "equity",
    }
}

db_enum! {
    pub enum InvestmentStage {
        Initial => "initial",
        FollowOn => "follow_on",
    }
}

db_enum! {
    /// Position the fund took in the round.
    pub enum InvestmentRole {
        Lead => "lead",
        CoLead => "co_lead",
        Follow => "follow",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Investment {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Joined from the company for display
    pub company_name: String,
    pub fund_id: Uuid,
    pub investment_date: NaiveDate,
    pub investment_type: Option<InvestmentType>,
    pub stage: Option<InvestmentStage>,
    pub amount: Option<f64>,
    pub ownership_percentage: Option<f64>,
    pub role: Option<InvestmentRole>,
    pub post_money_valuation: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvestment {
    pub company_id: Uuid,
    pub fund_id: Uuid,
    pub investment_date: NaiveDate,
    pub investment_type: Option<InvestmentType>,
    pub stage: Option<InvestmentStage>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub ownership_percentage: Option<f64>,
    pub role: Option<InvestmentRole>,
    #[validate(range(min = 0.0))]
    pub post_money_valuation: Option<f64>,
}

/// Inline-editable columns of an investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentField {
    InvestmentDate,
    InvestmentType,
    Stage,
    Amount,
    OwnershipPercentage,
    Role,
    PostMoneyValuation,
}

impl EditableField for InvestmentField {
    fn column(&self) -> &'static str {
        match self {
            Self::InvestmentDate => "investment_date",
            Self::InvestmentType => "investment_type",
            Self::Stage => "stage",
            Self::Amount => "amount",
            Self::OwnershipPercentage => "ownership_percentage",
            Self::Role => "role",
            Self::PostMoneyValuation => "post_money_valuation",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            Self::InvestmentDate => FieldKind::Date,
            Self::InvestmentType => FieldKind::Choice(InvestmentType::ALL),
            Self::Stage => FieldKind::Choice(InvestmentStage::ALL),
            Self::Role => FieldKind::Choice(InvestmentRole::ALL),
            Self::Amount | Self::OwnershipPercentage | Self::PostMoneyValuation => FieldKind::Real,
        }
    }

    fn required(&self) -> bool {
        matches!(self, Self::InvestmentDate)
    }
}
