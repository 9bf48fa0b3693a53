mod allowed_lps;
mod common;
mod companies;
mod fund_metrics;
mod funds;
mod investments;
mod updates;
mod users;

pub use allowed_lps::SqliteAllowedLpRepo;
pub use companies::SqliteCompanyRepo;
pub use fund_metrics::SqliteFundMetricsRepo;
pub use funds::SqliteFundRepo;
pub use investments::SqliteInvestmentRepo;
pub use updates::SqliteUpdateRepo;
pub use users::SqliteUserRepo;
