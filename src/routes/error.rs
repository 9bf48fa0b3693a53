use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::IdentityError,
    db::DbError,
    observability::metrics,
    services::{LpServiceError, OnboardingError},
};

/// Error body: `{"error": {"type", "message", "param", "code", "request_id"}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub param: Option<String>,
    pub code: Option<String>,
    /// Filled in by the request id middleware.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn with_type(
        error_type: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorInfo {
                error_type: error_type.into(),
                message: message.into(),
                param: None,
                code: Some(code.into()),
                request_id: None,
            },
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    /// The identity provider failed or could not be reached.
    Upstream(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Not signed in".to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DbError::Conflict(msg) => ApiError::Conflict(msg),
            DbError::Validation(msg) => ApiError::Validation(msg),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected { status: 401, .. } => {
                ApiError::Unauthorized("Session is no longer valid".to_string())
            }
            IdentityError::Rejected { message, .. } => ApiError::Validation(message),
            IdentityError::NotConfigured(what) => {
                ApiError::Internal(format!("identity provider not configured: {what}"))
            }
            IdentityError::Unavailable(_) | IdentityError::InvalidResponse(_) => {
                ApiError::Upstream(err.to_string())
            }
        }
    }
}

impl From<OnboardingError> for ApiError {
    fn from(err: OnboardingError) -> Self {
        match err {
            OnboardingError::NotAllowListed => ApiError::Forbidden(err.to_string()),
            OnboardingError::Identity(e) => e.into(),
            OnboardingError::Database(e) => e.into(),
        }
    }
}

impl From<LpServiceError> for ApiError {
    fn from(err: LpServiceError) -> Self {
        match err {
            LpServiceError::Identity(e) => e.into(),
            LpServiceError::Database(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, code, message) = match self {
            ApiError::Validation(msg) => ("invalid_request_error", "validation_error", msg),
            ApiError::Unauthorized(msg) => ("authentication_error", "unauthorized", msg),
            ApiError::Forbidden(msg) => ("permission_error", "forbidden", msg),
            ApiError::NotFound(msg) => ("not_found_error", "not_found", msg),
            ApiError::Conflict(msg) => ("invalid_request_error", "conflict", msg),
            ApiError::Upstream(msg) => {
                tracing::warn!(error = %msg, "Identity provider error");
                (
                    "server_error",
                    "identity_unavailable",
                    "The identity service is unavailable".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    "server_error",
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        metrics::record_api_error(error_type, code);

        (
            status,
            Json(ErrorResponse::with_type(error_type, code, message)),
        )
            .into_response()
    }
}
