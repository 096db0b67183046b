use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::domain::error::DomainError;
use crate::domain::policy::Actor;
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

/// The actor resolved for the current request. Requests without an
/// `Authorization` header are anonymous.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CurrentActor(pub(crate) Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentActor>()
            .copied()
            .unwrap_or(CurrentActor(Actor::Anonymous)))
    }
}

/// Resolves the bearer token, if any, into a [`CurrentActor`]. A header that
/// is present but unusable fails the request with 401.
pub(crate) async fn resolve_actor_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| bearer_token(value).map(str::to_owned))
        .transpose()?;
    let actor = match token {
        Some(token) => state.auth_service.resolve_actor(&token).await?,
        None => Actor::Anonymous,
    };

    request.extensions_mut().insert(CurrentActor(actor));
    Ok(next.run(request).await)
}

fn bearer_token(value: &HeaderValue) -> Result<&str, DomainError> {
    let value = value.to_str().map_err(|_| DomainError::Unauthenticated)?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or(DomainError::Unauthenticated)?;
    let token = parts.next().ok_or(DomainError::Unauthenticated)?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return Err(DomainError::Unauthenticated);
    }
    Ok(token)
}
