use std::sync::Arc;

use tracing::info;

use super::UpdateMode;
use crate::data::user_repository::{UserChanges, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::policy::{AccessPolicy, Action, Actor, Target};
use crate::domain::user::{UpdateUserRequest, User};

pub(crate) struct UserService {
    users: Arc<dyn UserRepository>,
    policy: AccessPolicy,
}

impl UserService {
    pub(crate) fn new(users: Arc<dyn UserRepository>, policy: AccessPolicy) -> Self {
        Self { users, policy }
    }

    pub(crate) async fn list_users(&self, actor: &Actor) -> Result<Vec<User>, DomainError> {
        self.policy.authorize(actor, Action::List, Target::Users)?;
        self.users.list_users().await
    }

    pub(crate) async fn get_user(&self, actor: &Actor, id: i64) -> Result<User, DomainError> {
        self.policy
            .authorize(actor, Action::Retrieve, Target::User { user_id: id })?;
        self.load_user(id).await
    }

    pub(crate) async fn update_user(
        &self,
        actor: &Actor,
        id: i64,
        mode: UpdateMode,
        req: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        self.policy
            .authorize(actor, Action::Update, Target::User { user_id: id })?;
        let user = self.load_user(id).await?;

        if mode == UpdateMode::Replace {
            req.require_full()?;
        }
        let req = req.validate()?;

        let changes = UserChanges {
            username: req.username.unwrap_or(user.username),
            email: req.email.unwrap_or(user.email),
            avatar: req.avatar.unwrap_or(user.avatar),
            bio: req.bio.unwrap_or(user.bio),
            theme: req.theme.unwrap_or(user.theme),
        };
        let updated = self
            .users
            .update_user(id, changes)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))?;
        info!(user_id = id, "user profile updated");
        Ok(updated)
    }

    pub(crate) async fn delete_user(&self, actor: &Actor, id: i64) -> Result<(), DomainError> {
        self.policy
            .authorize(actor, Action::Delete, Target::User { user_id: id })?;
        if !self.users.delete_user(id).await? {
            return Err(DomainError::NotFound(format!("user id: {id}")));
        }
        info!(user_id = id, "user deleted");
        Ok(())
    }

    async fn load_user(&self, id: i64) -> Result<User, DomainError> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))
    }
}
