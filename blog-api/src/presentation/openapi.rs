use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::auth::{
    AccessTokenDto, LoginDto, RefreshDto, RegisterDto, TokenPairDto, UserDto,
};
use crate::presentation::handlers::categories::{CategoryDto, CategoryWriteDto};
use crate::presentation::handlers::posts::{
    CommentDto, CommentWriteDto, LikeResponseDto, ListPostsResponseDto, MessageDto,
    PaginationQuery, PostDetailDto, PostListItemDto, PostWriteDto, PostWrittenDto,
};
use crate::presentation::handlers::users::{ProfileDto, ProfileWriteDto};
use crate::presentation::http_handlers::HealthzResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http_handlers::healthz,
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::refresh_token,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::replace_post,
        crate::presentation::handlers::posts::patch_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::add_comment,
        crate::presentation::handlers::posts::toggle_like,
        crate::presentation::handlers::posts::toggle_save,
        crate::presentation::handlers::posts::saved_posts,
        crate::presentation::handlers::categories::list_categories,
        crate::presentation::handlers::categories::get_category,
        crate::presentation::handlers::categories::create_category,
        crate::presentation::handlers::categories::update_category,
        crate::presentation::handlers::categories::delete_category,
        crate::presentation::handlers::users::list_users,
        crate::presentation::handlers::users::create_user,
        crate::presentation::handlers::users::get_user,
        crate::presentation::handlers::users::replace_user,
        crate::presentation::handlers::users::patch_user,
        crate::presentation::handlers::users::delete_user
    ),
    components(
        schemas(
            HealthzResponse,
            RegisterDto,
            LoginDto,
            RefreshDto,
            TokenPairDto,
            AccessTokenDto,
            UserDto,
            PaginationQuery,
            PostWriteDto,
            PostWrittenDto,
            PostListItemDto,
            ListPostsResponseDto,
            PostDetailDto,
            CommentWriteDto,
            CommentDto,
            LikeResponseDto,
            MessageDto,
            CategoryWriteDto,
            CategoryDto,
            ProfileDto,
            ProfileWriteDto
        )
    ),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "auth", description = "Registration and JWT issuance"),
        (name = "posts", description = "Posts, comments, likes and bookmarks"),
        (name = "categories", description = "Post categories"),
        (name = "users", description = "User profiles")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
