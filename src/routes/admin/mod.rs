//! Admin console JSON API. The session gate only lets admin profiles reach
//! these routes.

mod companies;
mod dashboard;
mod funds;
mod investments;
mod lps;
mod metrics;
mod updates;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard::summary))
        .route("/admin/funds", get(funds::list).post(funds::create))
        .route("/admin/lps", get(lps::list).post(lps::create))
        .route(
            "/admin/lps/{id}",
            patch(lps::update_field).delete(lps::delete),
        )
        .route("/admin/lps/{id}/funds", put(lps::set_funds))
        .route(
            "/admin/companies",
            get(companies::list).post(companies::create),
        )
        .route(
            "/admin/companies/{id}",
            patch(companies::update_field).delete(companies::delete),
        )
        .route("/admin/companies/{id}/funds", put(companies::set_funds))
        .route(
            "/admin/investments",
            get(investments::list).post(investments::create),
        )
        .route(
            "/admin/investments/{id}",
            patch(investments::update_field).delete(investments::delete),
        )
        .route("/admin/metrics", get(metrics::list).post(metrics::create))
        .route("/admin/metrics/{id}", patch(metrics::update_field))
        .route("/admin/updates", get(updates::list).post(updates::create))
        .route(
            "/admin/updates/{id}",
            get(updates::get).put(updates::save).delete(updates::delete),
        )
        .route("/admin/updates/{id}/publish", post(updates::publish))
        .route("/admin/updates/{id}/unpublish", post(updates::unpublish))
}
