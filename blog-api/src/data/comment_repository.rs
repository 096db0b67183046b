use async_trait::async_trait;

use crate::domain::comment::CommentView;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) text: String,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<CommentView, DomainError>;
    async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError>;
}
