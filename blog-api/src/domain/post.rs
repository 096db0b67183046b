use chrono::{DateTime, Utc};

use super::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author_id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) image: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tags: Vec<String>,
    pub(crate) views: i64,
    pub(crate) likes: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Row of a post listing: no body, joined author and category names.
#[derive(Debug, Clone)]
pub(crate) struct PostSummary {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author_username: String,
    pub(crate) category_name: Option<String>,
    pub(crate) comment_count: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) category_id: Option<i64>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            category_id: self.category_id.map(validate_category_id).transpose()?,
        })
    }
}

/// `None` keeps the stored value; `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) category_id: Option<Option<i64>>,
}

impl UpdatePostRequest {
    pub(crate) fn require_full(&self) -> Result<(), DomainError> {
        if self.title.is_none() {
            return Err(DomainError::validation("title", "this field is required"));
        }
        if self.content.is_none() {
            return Err(DomainError::validation("content", "this field is required"));
        }
        Ok(())
    }

    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: self.title.as_deref().map(normalize_title).transpose()?,
            content: self.content.as_deref().map(normalize_content).transpose()?,
            category_id: self
                .category_id
                .map(|id| id.map(validate_category_id).transpose())
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LikeToggle {
    pub(crate) liked: bool,
    pub(crate) likes: i64,
}

impl LikeToggle {
    pub(crate) fn message(&self) -> &'static str {
        if self.liked { "Liked" } else { "Unliked" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SaveToggle {
    pub(crate) saved: bool,
}

impl SaveToggle {
    pub(crate) fn message(&self) -> &'static str {
        if self.saved {
            "Post saved"
        } else {
            "Post unsaved"
        }
    }
}

fn validate_category_id(value: i64) -> Result<i64, DomainError> {
    if value <= 0 {
        return Err(DomainError::validation("category", "must be > 0"));
    }
    Ok(value)
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::validation("title", "must be 1..255 chars"));
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::validation("content", "must not be empty"));
    }
    Ok(content.to_string())
}
