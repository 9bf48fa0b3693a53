use axum::{Json, extract::State};

use crate::{AppState, routes::ApiError, services::DashboardSummary};

/// Landing summary for the admin console
#[tracing::instrument(name = "admin.dashboard", skip(state))]
pub async fn summary(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(state.services.dashboard.summary().await?))
}
