//! LP portal views.
//!
//! Every view is scoped to the caller's accessible funds. Fund-specific
//! views take `?fund=slug` and fall back to the first accessible fund.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use super::error::ApiError;
use crate::{
    AppState,
    gate::SessionContext,
    models::{Fund, FundMetrics, FundQuery, Update, UserProfile},
    services::{PortalSection, Portfolio, choose_fund, fund_query, portal_sections},
};

pub const NO_FUND_ACCESS: &str = "No fund access.";

pub fn portal_routes() -> Router<AppState> {
    Router::new()
        .route("/portal", get(home))
        .route("/portal/funds", get(funds))
        .route("/portal/stats", get(stats))
        .route("/portal/portfolio", get(portfolio))
        .route("/portal/updates", get(updates))
        .route("/portal/updates/{id}", get(update_detail))
}

#[derive(Debug, Serialize)]
pub struct PortalHome {
    pub funds: Vec<Fund>,
    pub sections: Vec<PortalSection>,
}

/// A view of one fund's data, or a message when the caller has no funds.
#[derive(Debug, Serialize)]
pub struct FundView<T> {
    pub fund: Option<Fund>,
    pub funds: Vec<Fund>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn profile(ctx: &SessionContext) -> Result<&UserProfile, ApiError> {
    ctx.profile.as_ref().ok_or_else(ApiError::unauthenticated)
}

/// Resolve the active fund and load its data with `load`.
async fn fund_view<T, F, Fut>(
    state: &AppState,
    ctx: &SessionContext,
    query: &FundQuery,
    load: F,
) -> Result<Json<FundView<T>>, ApiError>
where
    F: FnOnce(Uuid) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let funds = state
        .services
        .portal
        .accessible_funds(profile(ctx)?)
        .await?;

    let Some(active) = choose_fund(&funds, query.fund.as_deref()).cloned() else {
        return Ok(Json(FundView {
            fund: None,
            funds,
            message: Some(NO_FUND_ACCESS),
            data: None,
        }));
    };

    let data = load(active.id).await?;

    Ok(Json(FundView {
        fund: Some(active),
        funds,
        message: None,
        data: Some(data),
    }))
}

#[tracing::instrument(name = "portal.home", skip(state, ctx, query))]
pub async fn home(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<FundQuery>,
) -> Result<Json<PortalHome>, ApiError> {
    let funds = state
        .services
        .portal
        .accessible_funds(profile(&ctx)?)
        .await?;

    Ok(Json(PortalHome {
        funds,
        sections: portal_sections(query.fund.as_deref()),
    }))
}

#[tracing::instrument(name = "portal.funds", skip(state, ctx))]
pub async fn funds(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<Vec<Fund>>, ApiError> {
    Ok(Json(
        state
            .services
            .portal
            .accessible_funds(profile(&ctx)?)
            .await?,
    ))
}

#[tracing::instrument(name = "portal.stats", skip(state, ctx, query))]
pub async fn stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<FundQuery>,
) -> Result<Json<FundView<Vec<FundMetrics>>>, ApiError> {
    let portal = state.services.portal.clone();
    fund_view(&state, &ctx, &query, |fund_id| async move {
        portal.stats(fund_id).await.map_err(ApiError::from)
    })
    .await
}

#[tracing::instrument(name = "portal.portfolio", skip(state, ctx, query))]
pub async fn portfolio(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<FundQuery>,
) -> Result<Json<FundView<Portfolio>>, ApiError> {
    let portal = state.services.portal.clone();
    fund_view(&state, &ctx, &query, |fund_id| async move {
        portal.portfolio(fund_id).await.map_err(ApiError::from)
    })
    .await
}

#[tracing::instrument(name = "portal.updates", skip(state, ctx, query))]
pub async fn updates(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<FundQuery>,
) -> Result<Json<FundView<Vec<Update>>>, ApiError> {
    let portal = state.services.portal.clone();
    fund_view(&state, &ctx, &query, |fund_id| async move {
        portal.updates(fund_id).await.map_err(ApiError::from)
    })
    .await
}

/// One update, if the caller may read it. Anything else goes back to the
/// update list for the same fund.
#[tracing::instrument(name = "portal.update_detail", skip(state, ctx, query))]
pub async fn update_detail(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Query(query): Query<FundQuery>,
) -> Result<Response, ApiError> {
    let back = || {
        Redirect::to(&format!(
            "/portal/updates{}",
            fund_query(query.fund.as_deref())
        ))
        .into_response()
    };

    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(back());
    };

    match state
        .services
        .portal
        .update_detail(profile(&ctx)?, id)
        .await?
    {
        Some(update) => Ok(Json(update).into_response()),
        None => Ok(back()),
    }
}
