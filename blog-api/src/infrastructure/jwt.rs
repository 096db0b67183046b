use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::User;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("expected {expected:?} token, got {actual:?}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TokenKind {
    Access,
    Refresh,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) is_staff: bool,
    pub(crate) token_type: TokenKind,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct TokenPair {
    pub(crate) access: String,
    pub(crate) refresh: String,
}

pub(crate) struct JwtService {
    secret: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl JwtService {
    const DEFAULT_ACCESS_TTL_SECONDS: i64 = 30 * 60;
    const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

    pub(crate) fn new(secret: &str, access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        let access_ttl_seconds = if access_ttl_seconds > 0 {
            access_ttl_seconds
        } else {
            Self::DEFAULT_ACCESS_TTL_SECONDS
        };
        let refresh_ttl_seconds = if refresh_ttl_seconds > 0 {
            refresh_ttl_seconds
        } else {
            Self::DEFAULT_REFRESH_TTL_SECONDS
        };

        JwtService {
            secret: secret.into(),
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    pub(crate) fn generate_pair(&self, user: &User) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access: self.generate_token(user, TokenKind::Access)?,
            refresh: self.generate_token(user, TokenKind::Refresh)?,
        })
    }

    pub(crate) fn generate_token(&self, user: &User, kind: TokenKind) -> Result<String, JwtError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl_seconds,
            TokenKind::Refresh => self.refresh_ttl_seconds,
        };

        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_staff: user.is_staff,
            token_type: kind,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)
    }

    pub(crate) fn verify_token(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 10;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::Decode)?;

        let claims = token_data.claims;
        if claims.token_type != expected {
            return Err(JwtError::WrongKind {
                expected,
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }
}
