use async_trait::async_trait;

use crate::domain::category::Category;
use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait CategoryRepository: Send + Sync {
    async fn create_category(&self, name: &str) -> Result<Category, DomainError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError>;
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
    async fn update_category(&self, id: i64, name: &str) -> Result<Option<Category>, DomainError>;
    /// Unsets the category on referencing posts, then removes it.
    async fn delete_category(&self, id: i64) -> Result<bool, DomainError>;
}
