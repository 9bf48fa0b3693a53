use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{EditableField, FieldKind};

db_enum! {
    pub enum CompanyStatus {
        Active => "active",
        Exited => "exited",
        WrittenOff => "written_off",
    }
}

/// Portfolio company with the funds that hold it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub sector: Option<String>,
    pub location: Option<String>,
    pub status: CompanyStatus,
    pub ownership_percentage: Option<f64>,
    pub total_invested: Option<f64>,
    pub first_investment_date: Option<NaiveDate>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub fund_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCompany {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub sector: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[serde(default = "default_company_status")]
    pub status: CompanyStatus,
    #[validate(range(min = 0.0, max = 100.0))]
    pub ownership_percentage: Option<f64>,
    #[validate(range(min = 0.0))]
    pub total_invested: Option<f64>,
    pub first_investment_date: Option<NaiveDate>,
    #[validate(url)]
    pub website_url: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub fund_ids: Vec<Uuid>,
}

fn default_company_status() -> CompanyStatus {
    CompanyStatus::Active
}

/// Inline-editable columns of a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyField {
    Name,
    Sector,
    Location,
    Status,
    OwnershipPercentage,
    TotalInvested,
    FirstInvestmentDate,
    WebsiteUrl,
    Description,
}

impl EditableField for CompanyField {
    fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Sector => "sector",
            Self::Location => "location",
            Self::Status => "status",
            Self::OwnershipPercentage => "ownership_percentage",
            Self::TotalInvested => "total_invested",
            Self::FirstInvestmentDate => "first_investment_date",
            Self::WebsiteUrl => "website_url",
            Self::Description => "description",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            Self::Status => FieldKind::Choice(CompanyStatus::ALL),
            Self::OwnershipPercentage | Self::TotalInvested => FieldKind::Real,
            Self::FirstInvestmentDate => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }

    fn required(&self) -> bool {
        matches!(self, Self::Name | Self::Status)
    }
}
