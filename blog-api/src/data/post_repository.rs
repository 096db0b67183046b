use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{LikeToggle, Post, PostSummary, SaveToggle};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) category_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) category_id: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    /// Fails with `AlreadyExists("slug")` when the slug is taken.
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn slug_exists(&self, slug: &str) -> Result<bool, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    /// Removes the post together with its comments, likes and saves.
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<PostSummary>, DomainError>;
    async fn total_posts(&self) -> Result<i64, DomainError>;
    /// Flips the like relation and the counter atomically. `None` if the post is gone.
    async fn toggle_like(&self, post_id: i64, user_id: i64) -> Result<Option<LikeToggle>, DomainError>;
    async fn toggle_save(&self, post_id: i64, user_id: i64) -> Result<Option<SaveToggle>, DomainError>;
    async fn list_saved_posts(&self, user_id: i64) -> Result<Vec<PostSummary>, DomainError>;
}
