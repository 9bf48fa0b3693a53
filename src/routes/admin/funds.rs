use axum::{Json, extract::State, http::StatusCode};
use axum_valid::Valid;

use crate::{
    AppState,
    models::{CreateFund, Fund},
    routes::ApiError,
};

/// List funds by slug
#[tracing::instrument(name = "admin.funds.list", skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Fund>>, ApiError> {
    Ok(Json(state.services.funds.list().await?))
}

#[tracing::instrument(name = "admin.funds.create", skip(state, input), fields(slug = %input.slug))]
pub async fn create(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<CreateFund>>,
) -> Result<(StatusCode, Json<Fund>), ApiError> {
    let fund = state.services.funds.create(input).await?;
    tracing::info!(fund_id = %fund.id, "Fund created");
    Ok((StatusCode::CREATED, Json(fund)))
}
