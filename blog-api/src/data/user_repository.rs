use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::{Theme, User};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) avatar: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) is_staff: bool,
    pub(crate) is_superuser: bool,
}

/// Full set of client-editable profile columns.
#[derive(Debug, Clone)]
pub(crate) struct UserChanges {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) avatar: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) theme: Theme,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn list_users(&self) -> Result<Vec<User>, DomainError>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, DomainError>;
    /// Removes the user together with their posts, comments, likes and saves.
    async fn delete_user(&self, id: i64) -> Result<bool, DomainError>;
}
