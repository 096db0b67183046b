use tracing::{info, warn};

use super::UpdateMode;
use super::slug_assigner::SlugAssigner;
use crate::data::Repositories;
use crate::data::comment_repository::NewComment;
use crate::data::post_repository::{NewPost, Pagination, PostPatch};
use crate::domain::category::Category;
use crate::domain::comment::{CommentView, CreateCommentRequest};
use crate::domain::error::DomainError;
use crate::domain::policy::{AccessPolicy, Action, Actor, Target};
use crate::domain::post::{
    CreatePostRequest, LikeToggle, Post, PostSummary, SaveToggle, UpdatePostRequest,
};
use crate::domain::user::User;

const SLUG_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<PostSummary>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) total: i64,
}

/// A post with everything its detail view shows.
#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) author: User,
    pub(crate) category: Option<Category>,
    pub(crate) comments: Vec<CommentView>,
}

pub(crate) struct BlogService {
    repos: Repositories,
    policy: AccessPolicy,
    slugs: SlugAssigner,
}

impl BlogService {
    pub(crate) fn new(repos: Repositories, policy: AccessPolicy) -> Self {
        let slugs = SlugAssigner::new(repos.posts.clone());
        Self {
            repos,
            policy,
            slugs,
        }
    }

    pub(crate) async fn list_posts(
        &self,
        actor: &Actor,
        limit: u32,
        offset: u32,
    ) -> Result<ListPostsResult, DomainError> {
        self.policy.authorize(actor, Action::List, Target::Posts)?;

        let pagination = Pagination { limit, offset };
        let posts = self.repos.posts.list_posts(pagination).await?;
        let total = self.repos.posts.total_posts().await?;

        Ok(ListPostsResult {
            posts,
            limit,
            offset,
            total,
        })
    }

    pub(crate) async fn get_post(&self, actor: &Actor, id: i64) -> Result<PostDetail, DomainError> {
        let post = self.load_post(id).await?;
        self.policy.authorize(
            actor,
            Action::Retrieve,
            Target::Post {
                author_id: post.author_id,
            },
        )?;

        let author = self
            .repos
            .users
            .get_user(post.author_id)
            .await?
            .ok_or_else(|| DomainError::Unexpected(format!("post {id} has no author")))?;
        let category = match post.category_id {
            Some(category_id) => self.repos.categories.get_category(category_id).await?,
            None => None,
        };
        let comments = self.repos.comments.list_comments_for_post(id).await?;

        Ok(PostDetail {
            post,
            author,
            category,
            comments,
        })
    }

    pub(crate) async fn create_post(
        &self,
        actor: &Actor,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        self.policy.authorize(actor, Action::Create, Target::Posts)?;
        let author_id = actor.require_user_id()?;
        let req = req.validate()?;
        if let Some(category_id) = req.category_id {
            self.ensure_category(category_id).await?;
        }

        let mut attempt = 1;
        loop {
            let slug = self.slugs.assign(&req.title).await?;
            let new_post = NewPost {
                author_id,
                title: req.title.clone(),
                slug: slug.clone(),
                content: req.content.clone(),
                category_id: req.category_id,
            };

            match self.repos.posts.create_post(new_post).await {
                Ok(post) => {
                    info!(post_id = post.id, author_id, slug = %post.slug, "post created");
                    return Ok(post);
                }
                Err(DomainError::AlreadyExists(field))
                    if field == "slug" && attempt < SLUG_ATTEMPTS =>
                {
                    warn!(%slug, attempt, "slug taken concurrently, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub(crate) async fn update_post(
        &self,
        actor: &Actor,
        post_id: i64,
        mode: UpdateMode,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let post = self.load_post(post_id).await?;
        self.policy.authorize(
            actor,
            Action::Update,
            Target::Post {
                author_id: post.author_id,
            },
        )?;

        if mode == UpdateMode::Replace {
            req.require_full()?;
        }
        let req = req.validate()?;
        if let Some(Some(category_id)) = req.category_id {
            self.ensure_category(category_id).await?;
        }

        let patch = PostPatch {
            title: req.title.unwrap_or(post.title),
            content: req.content.unwrap_or(post.content),
            category_id: req.category_id.unwrap_or(post.category_id),
        };
        self.repos
            .posts
            .update_post(post_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }

    pub(crate) async fn delete_post(&self, actor: &Actor, post_id: i64) -> Result<(), DomainError> {
        let post = self.load_post(post_id).await?;
        self.policy.authorize(
            actor,
            Action::Delete,
            Target::Post {
                author_id: post.author_id,
            },
        )?;

        if !self.repos.posts.delete_post(post_id).await? {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }
        info!(post_id, "post deleted");
        Ok(())
    }

    pub(crate) async fn add_comment(
        &self,
        actor: &Actor,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<CommentView, DomainError> {
        let author_id = actor.require_user_id()?;
        let post = self.load_post(post_id).await?;
        self.policy.authorize(
            actor,
            Action::Comment,
            Target::Post {
                author_id: post.author_id,
            },
        )?;
        let text = req.validate()?;

        let comment = self
            .repos
            .comments
            .create_comment(NewComment {
                post_id,
                author_id,
                text,
            })
            .await?;
        info!(comment_id = comment.comment.id, post_id, author_id, "comment added");
        Ok(comment)
    }

    pub(crate) async fn toggle_like(
        &self,
        actor: &Actor,
        post_id: i64,
    ) -> Result<LikeToggle, DomainError> {
        let user_id = actor.require_user_id()?;
        let post = self.load_post(post_id).await?;
        self.policy.authorize(
            actor,
            Action::ToggleLike,
            Target::Post {
                author_id: post.author_id,
            },
        )?;

        let toggle = self
            .repos
            .posts
            .toggle_like(post_id, user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        info!(post_id, user_id, liked = toggle.liked, likes = toggle.likes, "like toggled");
        Ok(toggle)
    }

    pub(crate) async fn toggle_save(
        &self,
        actor: &Actor,
        post_id: i64,
    ) -> Result<SaveToggle, DomainError> {
        let user_id = actor.require_user_id()?;
        let post = self.load_post(post_id).await?;
        self.policy.authorize(
            actor,
            Action::ToggleSave,
            Target::Post {
                author_id: post.author_id,
            },
        )?;

        let toggle = self
            .repos
            .posts
            .toggle_save(post_id, user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        info!(post_id, user_id, saved = toggle.saved, "save toggled");
        Ok(toggle)
    }

    pub(crate) async fn saved_posts(&self, actor: &Actor) -> Result<Vec<PostSummary>, DomainError> {
        self.policy.authorize(actor, Action::ListSaved, Target::Posts)?;
        let user_id = actor.require_user_id()?;
        self.repos.posts.list_saved_posts(user_id).await
    }

    async fn load_post(&self, id: i64) -> Result<Post, DomainError> {
        self.repos
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    async fn ensure_category(&self, category_id: i64) -> Result<(), DomainError> {
        match self.repos.categories.get_category(category_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation(
                "category",
                "invalid pk - object does not exist",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BlogService;
    use crate::application::UpdateMode;
    use crate::data::Repositories;
    use crate::data::category_repository::CategoryRepository;
    use crate::data::repositories::memory::MemoryStore;
    use crate::data::user_repository::{NewUser, UserRepository};
    use crate::domain::comment::CreateCommentRequest;
    use crate::domain::error::DomainError;
    use crate::domain::policy::{AccessPolicy, Actor};
    use crate::domain::post::{CreatePostRequest, UpdatePostRequest};

    #[tokio::test]
    async fn same_title_gets_distinct_slugs() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;

        let first = service
            .create_post(&alice, create_request("Hello World", None))
            .await
            .expect("first post must be created");
        let second = service
            .create_post(&alice, create_request("Hello World", None))
            .await
            .expect("second post must be created");

        assert_eq!(first.slug, "hello-world");
        assert_eq!(second.slug, "hello-world-1");
    }

    #[tokio::test]
    async fn create_post_retries_when_slug_is_taken_concurrently() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        service
            .create_post(&alice, create_request("Race", None))
            .await
            .expect("first post must be created");

        store.hide_slugs_for_next_checks(1);
        let post = service
            .create_post(&alice, create_request("Race", None))
            .await
            .expect("retry must find a free slug");
        assert_eq!(post.slug, "race-1");
    }

    #[tokio::test]
    async fn create_post_requires_authentication() {
        let (_, service) = setup();
        let err = service
            .create_post(&Actor::Anonymous, create_request("Title", None))
            .await
            .expect_err("anonymous must be rejected");
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[tokio::test]
    async fn create_post_rejects_unknown_category() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let err = service
            .create_post(&alice, create_request("Title", Some(999)))
            .await
            .expect_err("missing category must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "category", .. }));
    }

    #[tokio::test]
    async fn update_is_limited_to_author_or_admin() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let admin = user(&store, "admin").await;
        let post = service
            .create_post(&alice, create_request("Title", None))
            .await
            .expect("post must be created");

        let patch = || UpdatePostRequest {
            title: Some("Edited".to_string()),
            ..Default::default()
        };

        let err = service
            .update_post(&bob, post.id, UpdateMode::Partial, patch())
            .await
            .expect_err("non-author must be rejected");
        assert!(matches!(err, DomainError::Forbidden));

        let admin = Actor::User {
            id: admin.user_id().expect("admin is authenticated"),
            is_admin: true,
        };
        let updated = service
            .update_post(&admin, post.id, UpdateMode::Partial, patch())
            .await
            .expect("admin may edit");
        assert_eq!(updated.title, "Edited");
        assert_eq!(updated.content, "content");
        assert_eq!(updated.slug, post.slug);
    }

    #[tokio::test]
    async fn replace_requires_title_and_content() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let post = service
            .create_post(&alice, create_request("Title", None))
            .await
            .expect("post must be created");

        let err = service
            .update_post(
                &alice,
                post.id,
                UpdateMode::Replace,
                UpdatePostRequest {
                    title: Some("Only title".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect_err("content is required for replace");
        assert!(matches!(err, DomainError::Validation { field: "content", .. }));
    }

    #[tokio::test]
    async fn patch_with_null_category_clears_it() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let category = store
            .create_category("Rust")
            .await
            .expect("category must be created");
        let post = service
            .create_post(&alice, create_request("Title", Some(category.id)))
            .await
            .expect("post must be created");
        assert_eq!(post.category_id, Some(category.id));

        let updated = service
            .update_post(
                &alice,
                post.id,
                UpdateMode::Partial,
                UpdatePostRequest {
                    category_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .expect("author may edit");
        assert_eq!(updated.category_id, None);
    }

    #[tokio::test]
    async fn missing_post_is_not_found_before_forbidden() {
        let (store, service) = setup();
        let bob = user(&store, "bob").await;
        let err = service
            .delete_post(&bob, 404)
            .await
            .expect_err("missing post must be reported");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn like_twice_restores_state() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let post = service
            .create_post(&alice, create_request("Title", None))
            .await
            .expect("post must be created");

        let liked = service
            .toggle_like(&bob, post.id)
            .await
            .expect("like must succeed");
        assert!(liked.liked);
        assert_eq!(liked.likes, 1);
        assert_eq!(liked.message(), "Liked");

        let unliked = service
            .toggle_like(&bob, post.id)
            .await
            .expect("unlike must succeed");
        assert!(!unliked.liked);
        assert_eq!(unliked.likes, 0);
        assert_eq!(unliked.message(), "Unliked");
        assert!(store.liked_by(post.id).is_empty());
    }

    #[tokio::test]
    async fn toggles_require_authentication() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let post = service
            .create_post(&alice, create_request("Title", None))
            .await
            .expect("post must be created");

        let err = service
            .toggle_like(&Actor::Anonymous, post.id)
            .await
            .expect_err("anonymous like must fail");
        assert!(matches!(err, DomainError::Unauthenticated));
        let err = service
            .toggle_save(&Actor::Anonymous, post.id)
            .await
            .expect_err("anonymous save must fail");
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[tokio::test]
    async fn save_toggle_drives_saved_listing() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let post = service
            .create_post(&alice, create_request("Keep me", None))
            .await
            .expect("post must be created");

        let saved = service
            .toggle_save(&bob, post.id)
            .await
            .expect("save must succeed");
        assert_eq!(saved.message(), "Post saved");
        let listing = service.saved_posts(&bob).await.expect("listing must succeed");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].title, "Keep me");
        assert!(service
            .saved_posts(&alice)
            .await
            .expect("listing must succeed")
            .is_empty());

        let unsaved = service
            .toggle_save(&bob, post.id)
            .await
            .expect("unsave must succeed");
        assert_eq!(unsaved.message(), "Post unsaved");
        assert!(service
            .saved_posts(&bob)
            .await
            .expect("listing must succeed")
            .is_empty());
    }

    #[tokio::test]
    async fn blank_comment_is_rejected_without_mutation() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let post = service
            .create_post(&alice, create_request("Title", None))
            .await
            .expect("post must be created");

        let err = service
            .add_comment(
                &alice,
                post.id,
                CreateCommentRequest {
                    text: Some("   ".to_string()),
                },
            )
            .await
            .expect_err("blank comment must fail");
        assert!(matches!(err, DomainError::Validation { field: "text", .. }));
        assert_eq!(store.comment_count(), 0);
    }

    #[tokio::test]
    async fn detail_includes_author_category_and_comments() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let category = store
            .create_category("News")
            .await
            .expect("category must be created");
        let post = service
            .create_post(&alice, create_request("Title", Some(category.id)))
            .await
            .expect("post must be created");
        service
            .add_comment(
                &bob,
                post.id,
                CreateCommentRequest {
                    text: Some("nice".to_string()),
                },
            )
            .await
            .expect("comment must be added");

        let detail = service
            .get_post(&Actor::Anonymous, post.id)
            .await
            .expect("detail must load");
        assert_eq!(detail.author.username, "alice");
        assert_eq!(detail.category.map(|c| c.name), Some("News".to_string()));
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].author_username, "bob");
        assert_eq!(detail.comments[0].post_title, "Title");
    }

    #[tokio::test]
    async fn deleting_category_keeps_posts() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let category = store
            .create_category("Temp")
            .await
            .expect("category must be created");
        let post = service
            .create_post(&alice, create_request("Title", Some(category.id)))
            .await
            .expect("post must be created");

        assert!(store
            .delete_category(category.id)
            .await
            .expect("delete must succeed"));

        let detail = service
            .get_post(&Actor::Anonymous, post.id)
            .await
            .expect("post must survive");
        assert_eq!(detail.post.category_id, None);
        assert!(detail.category.is_none());
    }

    #[tokio::test]
    async fn deleting_user_cascades_and_keeps_like_counts() {
        let (store, service) = setup();
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        let alice_post = service
            .create_post(&alice, create_request("Alice post", None))
            .await
            .expect("post must be created");
        service
            .create_post(&bob, create_request("Bob post", None))
            .await
            .expect("post must be created");
        service
            .toggle_like(&bob, alice_post.id)
            .await
            .expect("like must succeed");
        service
            .add_comment(
                &bob,
                alice_post.id,
                CreateCommentRequest {
                    text: Some("hi".to_string()),
                },
            )
            .await
            .expect("comment must be added");

        let bob_id = bob.user_id().expect("bob is authenticated");
        assert!(store.delete_user(bob_id).await.expect("delete must succeed"));

        let listing = service
            .list_posts(&Actor::Anonymous, 20, 0)
            .await
            .expect("listing must succeed");
        assert_eq!(listing.total, 1);
        assert_eq!(listing.posts[0].title, "Alice post");
        assert_eq!(listing.posts[0].comment_count, 0);

        let detail = service
            .get_post(&Actor::Anonymous, alice_post.id)
            .await
            .expect("post must load");
        assert_eq!(detail.post.likes, 0);
        assert!(store.liked_by(alice_post.id).is_empty());
    }

    fn setup() -> (MemoryStore, BlogService) {
        let store = MemoryStore::new();
        let service = BlogService::new(Repositories::in_memory(store.clone()), AccessPolicy);
        (store, service)
    }

    async fn user(store: &MemoryStore, username: &str) -> Actor {
        let user = store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
                avatar: None,
                bio: None,
                is_staff: false,
                is_superuser: false,
            })
            .await
            .expect("user must be created");
        Actor::User {
            id: user.id,
            is_admin: false,
        }
    }

    fn create_request(title: &str, category_id: Option<i64>) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: "content".to_string(),
            category_id,
        }
    }
}
