use chrono::{DateTime, Utc};

use super::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) text: String,
    pub(crate) likes: i64,
    pub(crate) created_at: DateTime<Utc>,
}

/// Comment joined with the names shown next to it.
#[derive(Debug, Clone)]
pub(crate) struct CommentView {
    pub(crate) comment: Comment,
    pub(crate) author_username: String,
    pub(crate) post_title: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCommentRequest {
    pub(crate) text: Option<String>,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<String, DomainError> {
        let Some(text) = self.text else {
            return Err(DomainError::validation("text", "this field is required"));
        };
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("text", "may not be blank"));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::CreateCommentRequest;
    use crate::domain::error::DomainError;

    #[test]
    fn missing_text_is_required() {
        let err = CreateCommentRequest { text: None }
            .validate()
            .expect_err("text is required");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "text",
                message: "this field is required"
            }
        ));
    }

    #[test]
    fn blank_text_is_rejected() {
        let req = CreateCommentRequest {
            text: Some(" \n ".to_string()),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn text_is_trimmed() {
        let req = CreateCommentRequest {
            text: Some("  nice post  ".to_string()),
        };
        assert_eq!(req.validate().expect("must be valid"), "nice post");
    }
}
