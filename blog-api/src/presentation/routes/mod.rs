use axum::{Router, middleware};

use super::AppState;
use super::middleware::auth::resolve_actor_middleware;

pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod posts;
pub(crate) mod users;

/// API routes. Every route sees a resolved actor.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(posts::router())
        .merge(categories::router())
        .merge(users::router())
        .route_layer(middleware::from_fn_with_state(
            state,
            resolve_actor_middleware,
        ))
}
