use std::sync::Arc;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::slug::{candidate, slugify};

/// Picks the first free slug derived from a post title.
pub(crate) struct SlugAssigner {
    posts: Arc<dyn PostRepository>,
}

impl SlugAssigner {
    pub(crate) fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    pub(crate) async fn assign(&self, title: &str) -> Result<String, DomainError> {
        let base = slugify(title);
        let mut attempt = 0;
        loop {
            let slug = candidate(&base, attempt);
            if !self.posts.slug_exists(&slug).await? {
                return Ok(slug);
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::SlugAssigner;
    use crate::data::post_repository::{NewPost, PostRepository};
    use crate::data::repositories::memory::MemoryStore;
    use crate::data::user_repository::{NewUser, UserRepository};

    #[tokio::test]
    async fn skips_taken_candidates() {
        let store = MemoryStore::new();
        let author = store
            .create_user(NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hash".to_string(),
                avatar: None,
                bio: None,
                is_staff: false,
                is_superuser: false,
            })
            .await
            .expect("user must be created");
        for slug in ["hello-world", "hello-world-1"] {
            store
                .create_post(NewPost {
                    author_id: author.id,
                    title: "Hello World".to_string(),
                    slug: slug.to_string(),
                    content: "body".to_string(),
                    category_id: None,
                })
                .await
                .expect("post must be created");
        }

        let assigner = SlugAssigner::new(Arc::new(store));
        let slug = assigner
            .assign("Hello, World!")
            .await
            .expect("slug must be assigned");
        assert_eq!(slug, "hello-world-2");
    }

    #[tokio::test]
    async fn untitled_symbols_fall_back_to_post() {
        let assigner = SlugAssigner::new(Arc::new(MemoryStore::new()));
        let slug = assigner.assign("!!!").await.expect("slug must be assigned");
        assert_eq!(slug, "post");
    }
}
