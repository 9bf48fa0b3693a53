use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    AppState,
    models::{Company, CompanyField, CreateCompany, FieldUpdate, SetFunds},
    routes::ApiError,
};

#[tracing::instrument(name = "admin.companies.list", skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Company>>, ApiError> {
    Ok(Json(state.services.companies.list().await?))
}

#[tracing::instrument(name = "admin.companies.create", skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<CreateCompany>>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let company = state.services.companies.create(input).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

#[tracing::instrument(name = "admin.companies.update_field", skip(state, input), fields(%id))]
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<FieldUpdate<CompanyField>>,
) -> Result<StatusCode, ApiError> {
    state.services.companies.update_field(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(name = "admin.companies.set_funds", skip(state, input), fields(%id))]
pub async fn set_funds(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SetFunds>,
) -> Result<Json<Company>, ApiError> {
    Ok(Json(
        state.services.companies.set_funds(id, &input.fund_ids).await?,
    ))
}

/// Delete a company. Companies with investments cannot be deleted.
#[tracing::instrument(name = "admin.companies.delete", skip(state), fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.companies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
