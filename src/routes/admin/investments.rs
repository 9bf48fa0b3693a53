use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    AppState,
    models::{CreateInvestment, FieldUpdate, Investment, InvestmentField},
    routes::ApiError,
};

/// List investments, newest first, with company names
#[tracing::instrument(name = "admin.investments.list", skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Investment>>, ApiError> {
    Ok(Json(state.services.investments.list().await?))
}

#[tracing::instrument(name = "admin.investments.create", skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<CreateInvestment>>,
) -> Result<(StatusCode, Json<Investment>), ApiError> {
    let investment = state.services.investments.create(input).await?;
    Ok((StatusCode::CREATED, Json(investment)))
}

#[tracing::instrument(name = "admin.investments.update_field", skip(state, input), fields(%id))]
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<FieldUpdate<InvestmentField>>,
) -> Result<StatusCode, ApiError> {
    state.services.investments.update_field(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "admin.investments.delete", skip(state), fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.investments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
