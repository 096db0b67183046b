use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("malformed request body: {0}")]
    Json(#[from] JsonRejection),

    #[error("malformed query string: {0}")]
    Query(#[from] QueryRejection),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

/// `Json` extractor whose rejection renders as an [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub(crate) struct AppJson<T>(pub(crate) T);

/// `Query` extractor whose rejection renders as an [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub(crate) struct AppQuery<T>(pub(crate) T);

type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg, fields) = match self {
            AppError::Domain(err) => match &err {
                DomainError::Validation { field, message } => (
                    StatusCode::BAD_REQUEST,
                    "validation failed".to_string(),
                    Some(single_field(field, message.to_string())),
                ),
                DomainError::AlreadyExists(field) => (
                    StatusCode::BAD_REQUEST,
                    "validation failed".to_string(),
                    Some(single_field(field, err.to_string())),
                ),
                DomainError::Unauthenticated | DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, err.to_string(), None)
                }
                DomainError::Forbidden => (
                    StatusCode::FORBIDDEN,
                    "you do not have permission to perform this action".to_string(),
                    None,
                ),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string(), None),
                DomainError::Unexpected(detail) => {
                    error!(%detail, "unexpected error while handling request");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal error".to_string(),
                        None,
                    )
                }
            },
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "validation failed".to_string(),
                Some(validation_fields(&err)),
            ),
            AppError::Json(err) => (StatusCode::BAD_REQUEST, err.body_text(), None),
            AppError::Query(err) => (StatusCode::BAD_REQUEST, err.body_text(), None),
        };

        let mut response = (status, Json(ErrorBody { error: msg, fields })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

fn single_field(field: &str, message: String) -> FieldErrors {
    BTreeMap::from([(field.to_string(), vec![message])])
}

fn validation_fields(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => err.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
