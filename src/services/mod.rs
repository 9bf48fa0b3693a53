mod companies;
mod dashboard;
mod fund_metrics;
mod funds;
mod investments;
mod lps;
mod onboarding;
mod portal;
mod updates;

use std::sync::Arc;

pub use companies::CompanyService;
pub use dashboard::{DashboardService, DashboardSummary};
pub use fund_metrics::FundMetricsService;
pub use funds::FundService;
pub use investments::InvestmentService;
pub use lps::{LpService, LpServiceError};
pub use onboarding::{EmailStatus, OnboardingError, OnboardingService};
pub use portal::{
    PortalSection, PortalService, Portfolio, choose_fund, fund_query, portal_sections,
};
pub use updates::UpdateService;

use crate::{auth::IdentityProvider, db::DbPool};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub onboarding: OnboardingService,
    pub dashboard: DashboardService,
    pub funds: FundService,
    pub lps: LpService,
    pub companies: CompanyService,
    pub investments: InvestmentService,
    pub fund_metrics: FundMetricsService,
    pub updates: UpdateService,
    pub portal: PortalService,
}

impl Services {
    pub fn new(db: Arc<DbPool>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            onboarding: OnboardingService::new(db.clone(), identity.clone()),
            dashboard: DashboardService::new(db.clone()),
            funds: FundService::new(db.clone()),
            lps: LpService::new(db.clone(), identity),
            companies: CompanyService::new(db.clone()),
            investments: InvestmentService::new(db.clone()),
            fund_metrics: FundMetricsService::new(db.clone()),
            updates: UpdateService::new(db.clone()),
            portal: PortalService::new(db),
        }
    }
}
