use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::category::{Category, CategoryRequest};
use crate::domain::error::DomainError;
use super::auth::required;
use crate::presentation::AppState;
use crate::presentation::app_error::{AppJson, AppResult};
use crate::presentation::middleware::auth::CurrentActor;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CategoryWriteDto {
    #[validate(length(min = 1, max = 100))]
    #[schema(value_type = String)]
    pub(crate) name: Option<String>,
}

impl TryFrom<CategoryWriteDto> for CategoryRequest {
    type Error = DomainError;

    fn try_from(dto: CategoryWriteDto) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required("name", dto.name)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/categories/",
    tag = "categories",
    responses(
        (status = 200, description = "All categories", body = [CategoryDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<CategoryDto>>> {
    let categories = state.category_service.list_categories(&actor).await?;
    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/",
    tag = "categories",
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category found", body = CategoryDto),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_category(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<Json<CategoryDto>> {
    let category = state.category_service.get_category(&actor, id).await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    post,
    path = "/api/categories/",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CategoryWriteDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Validation error or duplicate name"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_category(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    AppJson(dto): AppJson<CategoryWriteDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    dto.validate()?;

    let category = state
        .category_service
        .create_category(&actor, dto.try_into()?)
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// Serves both PUT and PATCH: `name` is the only writable field.
#[utoipa::path(
    put,
    path = "/api/categories/{id}/",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    request_body = CategoryWriteDto,
    responses(
        (status = 200, description = "Category renamed", body = CategoryDto),
        (status = 400, description = "Validation error or duplicate name"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_category(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<CategoryWriteDto>,
) -> AppResult<Json<CategoryDto>> {
    dto.validate()?;

    let category = state
        .category_service
        .update_category(&actor, id, dto.try_into()?)
        .await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}/",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Category deleted, posts keep existing without it"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_category(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.category_service.delete_category(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
