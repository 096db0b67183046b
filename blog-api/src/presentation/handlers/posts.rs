use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::auth::UserDto;
use super::categories::CategoryDto;
use super::double_option;
use crate::application::UpdateMode;
use crate::application::blog_service::{ListPostsResult, PostDetail};
use crate::domain::comment::{CommentView, CreateCommentRequest};
use crate::domain::error::DomainError;
use crate::domain::policy::Actor;
use crate::domain::post::{CreatePostRequest, Post, PostSummary, UpdatePostRequest};
use crate::domain::time_since::ago;
use crate::presentation::AppState;
use crate::presentation::app_error::{AppJson, AppQuery, AppResult};
use crate::presentation::middleware::auth::CurrentActor;

const DEFAULT_LIMIT: u32 = 20;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PaginationQuery {
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
}

/// Request body of create, replace and partial update. Server-controlled
/// fields (slug, author, counters, timestamps) are not read.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostWriteDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    /// Category id; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub(crate) category: Option<Option<i64>>,
}

impl PostWriteDto {
    fn into_create_request(self) -> Result<CreatePostRequest, DomainError> {
        Ok(CreatePostRequest {
            title: self
                .title
                .ok_or(DomainError::validation("title", "this field is required"))?,
            content: self
                .content
                .ok_or(DomainError::validation("content", "this field is required"))?,
            category_id: self.category.flatten(),
        })
    }
}

impl From<PostWriteDto> for UpdatePostRequest {
    fn from(dto: PostWriteDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            category_id: dto.category,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CommentWriteDto {
    pub(crate) text: Option<String>,
}

/// Response of create and update.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostWrittenDto {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) category: Option<i64>,
}

impl From<Post> for PostWrittenDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            content: post.content,
            category: post.category_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostListItemDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author_username: String,
    pub(crate) category_name: Option<String>,
    pub(crate) comment_count: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<PostSummary> for PostListItemDto {
    fn from(summary: PostSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            author_username: summary.author_username,
            category_name: summary.category_name,
            comment_count: summary.comment_count,
            created_at: summary.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostListItemDto>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) total: i64,
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        Self {
            posts: result.posts.into_iter().map(PostListItemDto::from).collect(),
            limit: result.limit,
            offset: result.offset,
            total: result.total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) author: i64,
    pub(crate) author_username: String,
    pub(crate) post: i64,
    pub(crate) post_title: String,
    pub(crate) text: String,
    pub(crate) likes: i64,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<CommentView> for CommentDto {
    fn from(view: CommentView) -> Self {
        Self {
            id: view.comment.id,
            author: view.comment.author_id,
            author_username: view.author_username,
            post: view.comment.post_id,
            post_title: view.post_title,
            text: view.comment.text,
            likes: view.comment.likes,
            created_at: view.comment.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) image: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) views: i64,
    pub(crate) likes: i64,
    pub(crate) author: UserDto,
    pub(crate) category: Option<CategoryDto>,
    pub(crate) comments: Vec<CommentDto>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    /// Relative age, e.g. `"3 days, 2 hours ago"`.
    pub(crate) time_since_created: String,
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        let post = detail.post;
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            image: post.image,
            tags: post.tags,
            views: post.views,
            likes: post.likes,
            author: detail.author.into(),
            category: detail.category.map(CategoryDto::from),
            comments: detail.comments.into_iter().map(CommentDto::from).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            time_since_created: ago(post.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LikeResponseDto {
    pub(crate) message: String,
    pub(crate) likes: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MessageDto {
    pub(crate) message: String,
}

#[utoipa::path(
    get,
    path = "/api/posts/",
    tag = "posts",
    params(
        ("limit" = Option<u32>, Query, description = "Items per page (1..=100)"),
        ("offset" = Option<u32>, Query, description = "Offset from the beginning (>= 0)")
    ),
    responses(
        (status = 200, description = "Posts listed, newest first", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> AppResult<Json<ListPostsResponseDto>> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let result = state.blog_service.list_posts(&actor, limit, offset).await?;
    Ok(Json(ListPostsResponseDto::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDetailDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDetailDto>> {
    let detail = state.blog_service.get_post(&actor, id).await?;
    Ok(Json(PostDetailDto::from(detail)))
}

#[utoipa::path(
    post,
    path = "/api/posts/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostWriteDto,
    responses(
        (status = 201, description = "Post created", body = PostWrittenDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    AppJson(dto): AppJson<PostWriteDto>,
) -> AppResult<(StatusCode, Json<PostWrittenDto>)> {
    dto.validate()?;

    let post = state
        .blog_service
        .create_post(&actor, dto.into_create_request()?)
        .await?;
    Ok((StatusCode::CREATED, Json(PostWrittenDto::from(post))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = PostWriteDto,
    responses(
        (status = 200, description = "Post replaced", body = PostWrittenDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn replace_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<PostWriteDto>,
) -> AppResult<Json<PostWrittenDto>> {
    update(state, actor, id, UpdateMode::Replace, dto).await
}

#[utoipa::path(
    patch,
    path = "/api/posts/{id}/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = PostWriteDto,
    responses(
        (status = 200, description = "Post updated", body = PostWrittenDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn patch_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<PostWriteDto>,
) -> AppResult<Json<PostWrittenDto>> {
    update(state, actor, id, UpdateMode::Partial, dto).await
}

async fn update(
    state: AppState,
    actor: Actor,
    id: i64,
    mode: UpdateMode,
    dto: PostWriteDto,
) -> AppResult<Json<PostWrittenDto>> {
    dto.validate()?;

    let post = state
        .blog_service
        .update_post(&actor, id, mode, dto.into())
        .await?;
    Ok(Json(PostWrittenDto::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.blog_service.delete_post(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comment/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = CommentWriteDto,
    responses(
        (status = 201, description = "Comment added", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<CommentWriteDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let comment = state
        .blog_service
        .add_comment(&actor, id, CreateCommentRequest { text: dto.text })
        .await?;
    Ok((StatusCode::CREATED, Json(CommentDto::from(comment))))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/like/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Like toggled", body = LikeResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<LikeResponseDto>> {
    let toggle = state.blog_service.toggle_like(&actor, id).await?;
    Ok(Json(LikeResponseDto {
        message: toggle.message().to_string(),
        likes: toggle.likes,
    }))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/save_post/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Save toggled", body = MessageDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn toggle_save(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageDto>> {
    let toggle = state.blog_service.toggle_save(&actor, id).await?;
    Ok(Json(MessageDto {
        message: toggle.message().to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/posts/saved/",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Posts saved by the caller, newest first", body = [PostListItemDto]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn saved_posts(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<PostListItemDto>>> {
    let posts = state.blog_service.saved_posts(&actor).await?;
    Ok(Json(posts.into_iter().map(PostListItemDto::from).collect()))
}
