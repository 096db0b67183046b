use axum::Router;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    add_comment, create_post, delete_post, get_post, list_posts, patch_post, replace_post,
    saved_posts, toggle_like, toggle_save,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts/", get(list_posts).post(create_post))
        .route("/api/posts/saved/", get(saved_posts))
        .route(
            "/api/posts/{id}/",
            get(get_post)
                .put(replace_post)
                .patch(patch_post)
                .delete(delete_post),
        )
        .route("/api/posts/{id}/comment/", post(add_comment))
        .route("/api/posts/{id}/like/", post(toggle_like))
        .route("/api/posts/{id}/save_post/", post(toggle_save))
}
