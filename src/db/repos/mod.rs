mod allowed_lps;
mod companies;
mod fund_metrics;
mod funds;
mod investments;
mod updates;
mod users;

pub use allowed_lps::*;
pub use companies::*;
pub use fund_metrics::*;
pub use funds::*;
pub use investments::*;
pub use updates::*;
pub use users::*;
