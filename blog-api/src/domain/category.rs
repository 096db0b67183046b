use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryRequest {
    pub(crate) name: String,
}

impl CategoryRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err(DomainError::validation("name", "must be 1..100 chars"));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }
}
