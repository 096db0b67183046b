use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppJson, AppResult};
use crate::presentation::middleware::auth::CurrentActor;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(length(min = 3, max = 64))]
    #[schema(value_type = String)]
    pub(crate) username: Option<String>,
    #[validate(email)]
    #[schema(value_type = String)]
    pub(crate) email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    #[schema(value_type = String)]
    pub(crate) password: Option<String>,
    pub(crate) avatar: Option<String>,
    pub(crate) bio: Option<String>,
}

impl TryFrom<RegisterDto> for RegisterRequest {
    type Error = DomainError;

    fn try_from(dto: RegisterDto) -> Result<Self, Self::Error> {
        Ok(Self {
            username: required("username", dto.username)?,
            email: required("email", dto.email)?,
            password: required("password", dto.password)?,
            avatar: dto.avatar,
            bio: dto.bio,
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    #[validate(length(min = 1, max = 64))]
    #[schema(value_type = String)]
    pub(crate) username: Option<String>,
    #[validate(length(min = 1))]
    #[schema(value_type = String)]
    pub(crate) password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RefreshDto {
    #[validate(length(min = 1))]
    #[schema(value_type = String)]
    pub(crate) refresh: Option<String>,
}

/// Absent required body fields become field errors instead of a body rejection.
pub(crate) fn required(
    field: &'static str,
    value: Option<String>,
) -> Result<String, DomainError> {
    value.ok_or(DomainError::validation(field, "this field is required"))
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TokenPairDto {
    pub(crate) access: String,
    pub(crate) refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AccessTokenDto {
    pub(crate) access: String,
}

/// Public user shape, also embedded as a post's author.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) avatar: Option<String>,
    pub(crate) bio: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            bio: user.bio,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register/",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = UserDto),
        (status = 400, description = "Validation error or duplicate username/email"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    AppJson(dto): AppJson<RegisterDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;

    let user = state.auth_service.register(&actor, dto.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login/",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = TokenPairDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    AppJson(dto): AppJson<LoginDto>,
) -> AppResult<Json<TokenPairDto>> {
    dto.validate()?;

    let req = LoginRequest {
        username: required("username", dto.username)?,
        password: required("password", dto.password)?,
    };
    let tokens = state.auth_service.login(req).await?;

    Ok(Json(TokenPairDto {
        access: tokens.access,
        refresh: tokens.refresh,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/token/refresh/",
    tag = "auth",
    request_body = RefreshDto,
    responses(
        (status = 200, description = "New access token", body = AccessTokenDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Refresh token invalid or expired"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn refresh_token(
    State(state): State<AppState>,
    AppJson(dto): AppJson<RefreshDto>,
) -> AppResult<Json<AccessTokenDto>> {
    dto.validate()?;

    let refresh = required("refresh", dto.refresh)?;
    let access = state.auth_service.refresh(&refresh).await?;
    Ok(Json(AccessTokenDto { access }))
}
