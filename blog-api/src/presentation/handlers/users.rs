use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::auth::{RegisterDto, UserDto};
use super::double_option;
use crate::application::UpdateMode;
use crate::domain::policy::Actor;
use crate::domain::user::{Theme, UpdateUserRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppJson, AppResult};
use crate::presentation::middleware::auth::CurrentActor;

/// Profile shape returned by the `/api/users/` endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) avatar: Option<String>,
    pub(crate) bio: Option<String>,
    #[schema(value_type = String, example = "light")]
    pub(crate) theme: Theme,
    pub(crate) is_staff: bool,
    pub(crate) joined_at: DateTime<Utc>,
}

impl From<User> for ProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            bio: user.bio,
            theme: user.theme,
            is_staff: user.is_staff,
            joined_at: user.joined_at,
        }
    }
}

/// Profile changes. Password and account flags are not accepted here.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ProfileWriteDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: Option<String>,
    pub(crate) email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) avatar: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) bio: Option<Option<String>>,
    #[schema(value_type = Option<String>, example = "dark")]
    pub(crate) theme: Option<Theme>,
}

impl From<ProfileWriteDto> for UpdateUserRequest {
    fn from(dto: ProfileWriteDto) -> Self {
        Self {
            username: dto.username,
            email: dto.email,
            avatar: dto.avatar,
            bio: dto.bio,
            theme: dto.theme,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/users/",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All users", body = [ProfileDto]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<ProfileDto>>> {
    let users = state.user_service.list_users(&actor).await?;
    Ok(Json(users.into_iter().map(ProfileDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/users/",
    tag = "users",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = UserDto),
        (status = 400, description = "Validation error or duplicate username/email"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    AppJson(dto): AppJson<RegisterDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;

    let user = state.auth_service.register(&actor, dto.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User found", body = ProfileDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the user themself or an admin"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<ProfileDto>> {
    let user = state.user_service.get_user(&actor, id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "User id")
    ),
    request_body = ProfileWriteDto,
    responses(
        (status = 200, description = "Profile replaced", body = ProfileDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the user themself or an admin"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn replace_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<ProfileWriteDto>,
) -> AppResult<Json<ProfileDto>> {
    update(state, actor, id, UpdateMode::Replace, dto).await
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "User id")
    ),
    request_body = ProfileWriteDto,
    responses(
        (status = 200, description = "Profile updated", body = ProfileDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the user themself or an admin"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn patch_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<ProfileWriteDto>,
) -> AppResult<Json<ProfileDto>> {
    update(state, actor, id, UpdateMode::Partial, dto).await
}

async fn update(
    state: AppState,
    actor: Actor,
    id: i64,
    mode: UpdateMode,
    dto: ProfileWriteDto,
) -> AppResult<Json<ProfileDto>> {
    dto.validate()?;

    let user = state
        .user_service
        .update_user(&actor, id, mode, dto.into())
        .await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User and their content deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.user_service.delete_user(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
