use thiserror::Error;

/// Failure talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider answered with a 4xx other than 408 or 429. Credentials,
    /// codes and tokens that the provider refuses land here.
    #[error("Identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx, 408, 429, transport failure or timeout.
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid response from identity provider: {0}")]
    InvalidResponse(String),

    #[error("Identity provider not configured for {0}")]
    NotConfigured(&'static str),
}

impl IdentityError {
    /// Label used for the `status` dimension of identity request metrics.
    pub fn metric_status(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Unavailable(_) => "unavailable",
            Self::InvalidResponse(_) => "invalid_response",
            Self::NotConfigured(_) => "not_configured",
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
