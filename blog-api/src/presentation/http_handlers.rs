use axum::{Json, Router, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use super::{AppState, routes};

/// Full HTTP surface minus docs: health probe plus the actor-aware API.
pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(routes::router(state.clone()))
        .with_state(state)
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthzResponse {
    status: &'static str,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Process is up", body = HealthzResponse)
    )
)]
pub(crate) async fn healthz() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}
