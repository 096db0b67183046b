use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::{debug, info};

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::policy::{AccessPolicy, Action, Actor, Target};
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::{JwtService, TokenKind, TokenPair};

pub(crate) struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    policy: AccessPolicy,
}

impl AuthService {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(
        users: Arc<dyn UserRepository>,
        jwt: Arc<JwtService>,
        policy: AccessPolicy,
    ) -> Self {
        Self { users, jwt, policy }
    }

    pub(crate) async fn register(
        &self,
        actor: &Actor,
        req: RegisterRequest,
    ) -> Result<User, DomainError> {
        self.policy.authorize(actor, Action::Create, Target::Users)?;
        let user = self.create_user(req, false).await?;
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Creates a staff + superuser account. Used for bootstrapping from the CLI,
    /// so no actor is involved.
    pub(crate) async fn create_admin(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let user = self.create_user(req, true).await?;
        info!(user_id = user.id, username = %user.username, "admin user created");
        Ok(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<TokenPair, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.users.find_by_username(&req.username).await? {
            Some(user_creds) => user_creds,
            None => {
                // keep timing close to the "user exists" path
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        self.verify_password(&req.password, &user_creds.password_hash)?;

        let tokens = self
            .jwt
            .generate_pair(&user_creds.user)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        debug!(user_id = user_creds.user.id, "login succeeded");
        Ok(tokens)
    }

    /// Exchanges a refresh token for a new access token.
    pub(crate) async fn refresh(&self, refresh_token: &str) -> Result<String, DomainError> {
        let claims = self
            .jwt
            .verify_token(refresh_token.trim(), TokenKind::Refresh)
            .map_err(|_| DomainError::Unauthenticated)?;

        let user = self
            .users
            .get_user(claims.user_id)
            .await?
            .ok_or(DomainError::Unauthenticated)?;

        self.jwt
            .generate_token(&user, TokenKind::Access)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    /// Turns a bearer access token into the acting user. Flags come from the
    /// stored row, not from the token claims.
    pub(crate) async fn resolve_actor(&self, access_token: &str) -> Result<Actor, DomainError> {
        let claims = self
            .jwt
            .verify_token(access_token, TokenKind::Access)
            .map_err(|_| DomainError::Unauthenticated)?;

        let user = self
            .users
            .get_user(claims.user_id)
            .await?
            .ok_or(DomainError::Unauthenticated)?;

        Ok(Actor::User {
            id: user.id,
            is_admin: user.is_admin(),
        })
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    async fn create_user(&self, req: RegisterRequest, admin: bool) -> Result<User, DomainError> {
        let req = req.validate()?;
        let password_hash = self.hash_password(&req.password)?;

        self.users
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                avatar: req.avatar,
                bio: req.bio,
                is_staff: admin,
                is_superuser: admin,
            })
            .await
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}
