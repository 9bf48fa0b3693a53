//! Quarterly fund metrics.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    AppState,
    models::{CreateQuarter, FieldUpdate, FundMetrics, FundMetricsField, MetricsQuery},
    routes::ApiError,
};

#[tracing::instrument(name = "admin.metrics.list", skip(state), fields(fund_id = %query.fund_id))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<Vec<FundMetrics>>, ApiError> {
    Ok(Json(
        state.services.fund_metrics.list_for_fund(query.fund_id).await?,
    ))
}

/// Start a new quarter for a fund. Each (fund, year, quarter) exists once.
#[tracing::instrument(name = "admin.metrics.create", skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<CreateQuarter>>,
) -> Result<(StatusCode, Json<FundMetrics>), ApiError> {
    let row = state.services.fund_metrics.create_quarter(input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[tracing::instrument(name = "admin.metrics.update_field", skip(state, input), fields(%id))]
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<FieldUpdate<FundMetricsField>>,
) -> Result<StatusCode, ApiError> {
    state.services.fund_metrics.update_field(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
