//! LP updates: drafts, publishing and fund visibility.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    AppState,
    models::{Update, UpdateContent},
    routes::ApiError,
};

#[tracing::instrument(name = "admin.updates.list", skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Update>>, ApiError> {
    Ok(Json(state.services.updates.list().await?))
}

#[tracing::instrument(name = "admin.updates.get", skip(state), fields(%id))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Update>, ApiError> {
    let update = state
        .services
        .updates
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Update not found".to_string()))?;
    Ok(Json(update))
}

/// Create a draft
#[tracing::instrument(name = "admin.updates.create", skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Valid(Json(input)): Valid<Json<UpdateContent>>,
) -> Result<(StatusCode, Json<Update>), ApiError> {
    let update = state.services.updates.create(input).await?;
    Ok((StatusCode::CREATED, Json(update)))
}

/// Save title and body and replace the visible funds
#[tracing::instrument(name = "admin.updates.save", skip(state, input), fields(%id))]
pub async fn save(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Valid(Json(input)): Valid<Json<UpdateContent>>,
) -> Result<Json<Update>, ApiError> {
    Ok(Json(state.services.updates.save(id, input).await?))
}

#[tracing::instrument(name = "admin.updates.publish", skip(state), fields(%id))]
pub async fn publish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Update>, ApiError> {
    let update = state.services.updates.publish(id).await?;
    tracing::info!("Update published");
    Ok(Json(update))
}

#[tracing::instrument(name = "admin.updates.unpublish", skip(state), fields(%id))]
pub async fn unpublish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Update>, ApiError> {
    Ok(Json(state.services.updates.unpublish(id).await?))
}

#[tracing::instrument(name = "admin.updates.delete", skip(state), fields(%id))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.services.updates.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
