use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::users::{
    create_user, delete_user, get_user, list_users, patch_user, replace_user,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/", get(list_users).post(create_user))
        .route(
            "/api/users/{id}/",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user),
        )
}
