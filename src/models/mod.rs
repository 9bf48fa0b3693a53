/// Declares a closed string enum stored as lowercase TEXT.
///
/// Generates `as_str`, `from_str` (returning `None` for unknown values),
/// `ALL` with every stored value, and `Display`.
macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [&'static str] = &[$($value),+];

            /// Convert to string for database storage
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $value ),+
                }
            }

            /// Parse from database string
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    $( $value => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

mod allowed_lp;
mod company;
mod field;
mod fund;
mod fund_metrics;
mod investment;
mod update;
mod user;
mod validators;

pub use allowed_lp::*;
pub use company::*;
pub use field::*;
pub use fund::*;
pub use fund_metrics::*;
pub use investment::*;
pub use update::*;
pub use user::*;
pub use validators::*;
