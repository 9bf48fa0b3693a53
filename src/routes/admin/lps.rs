//! Allow-list management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_valid::Valid;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    AppState,
    models::{AllowedLp, AllowedLpField, AllowedLpWithAccess, CreateAllowedLp, FieldUpdate, SetFunds},
    routes::ApiError,
};

#[derive(Debug, Serialize)]
pub struct FundAccess {
    pub fund_ids: Vec<Uuid>,
}

#[tracing::instrument(name = "admin.lps.list", skip(state))]
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<AllowedLpWithAccess>>, ApiError> {
    Ok(Json(state.services.lps.list().await?))
}

/// Add an LP to the allow-list. Duplicate emails conflict.
#[tracing::instrument(name = "admin.lps.create", skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<CreateAllowedLp>>,
) -> Result<(StatusCode, Json<AllowedLp>), ApiError> {
    let lp = state.services.lps.create(input).await?;
    tracing::info!(allowed_lp_id = %lp.id, "LP added to allow-list");
    Ok((StatusCode::CREATED, Json(lp)))
}

#[tracing::instrument(name = "admin.lps.update_field", skip(state, input), fields(%id))]
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<FieldUpdate<AllowedLpField>>,
) -> Result<StatusCode, ApiError> {
    state.services.lps.update_field(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "admin.lps.set_funds", skip(state, input), fields(%id))]
pub async fn set_funds(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SetFunds>,
) -> Result<Json<FundAccess>, ApiError> {
    let fund_ids = state.services.lps.set_funds(id, &input.fund_ids).await?;
    Ok(Json(FundAccess { fund_ids }))
}

/// Remove an LP, including the identity account when one exists.
#[tracing::instrument(name = "admin.lps.delete", skip(state), fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.lps.delete(id).await?;
    tracing::info!("LP removed from allow-list");
    Ok(StatusCode::NO_CONTENT)
}
