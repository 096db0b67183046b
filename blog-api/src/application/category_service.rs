use std::sync::Arc;

use tracing::info;

use crate::data::category_repository::CategoryRepository;
use crate::domain::category::{Category, CategoryRequest};
use crate::domain::error::DomainError;
use crate::domain::policy::{AccessPolicy, Action, Actor, Target};

pub(crate) struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    policy: AccessPolicy,
}

impl CategoryService {
    pub(crate) fn new(categories: Arc<dyn CategoryRepository>, policy: AccessPolicy) -> Self {
        Self { categories, policy }
    }

    pub(crate) async fn list_categories(&self, actor: &Actor) -> Result<Vec<Category>, DomainError> {
        self.policy
            .authorize(actor, Action::List, Target::Categories)?;
        self.categories.list_categories().await
    }

    pub(crate) async fn get_category(&self, actor: &Actor, id: i64) -> Result<Category, DomainError> {
        self.policy
            .authorize(actor, Action::Retrieve, Target::Category)?;
        self.categories
            .get_category(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("category id: {id}")))
    }

    pub(crate) async fn create_category(
        &self,
        actor: &Actor,
        req: CategoryRequest,
    ) -> Result<Category, DomainError> {
        self.policy
            .authorize(actor, Action::Create, Target::Categories)?;
        let req = req.validate()?;
        let category = self.categories.create_category(&req.name).await?;
        info!(category_id = category.id, name = %category.name, "category created");
        Ok(category)
    }

    /// The name is the only field, so replace and partial updates coincide.
    pub(crate) async fn update_category(
        &self,
        actor: &Actor,
        id: i64,
        req: CategoryRequest,
    ) -> Result<Category, DomainError> {
        self.policy
            .authorize(actor, Action::Update, Target::Category)?;
        let req = req.validate()?;
        self.categories
            .update_category(id, &req.name)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("category id: {id}")))
    }

    pub(crate) async fn delete_category(&self, actor: &Actor, id: i64) -> Result<(), DomainError> {
        self.policy
            .authorize(actor, Action::Delete, Target::Category)?;
        if !self.categories.delete_category(id).await? {
            return Err(DomainError::NotFound(format!("category id: {id}")));
        }
        info!(category_id = id, "category deleted");
        Ok(())
    }
}
