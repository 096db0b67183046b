//! In-memory storage used by the test suite. Mirrors the uniqueness,
//! cascade and set-null rules of the Postgres schema.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserChanges, UserCredentials, UserRepository};
use crate::domain::category::Category;
use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;
use crate::domain::post::{LikeToggle, Post, PostSummary, SaveToggle};
use crate::domain::user::{Theme, User};

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    users: BTreeMap<i64, UserCredentials>,
    categories: BTreeMap<i64, Category>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    /// (post_id, user_id)
    likes: BTreeSet<(i64, i64)>,
    saves: BTreeSet<(i64, i64)>,
    /// Number of upcoming `slug_exists` calls that answer `false`.
    stale_slug_checks: usize,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn summary(&self, post: &Post) -> PostSummary {
        PostSummary {
            id: post.id,
            title: post.title.clone(),
            author_username: self
                .users
                .get(&post.author_id)
                .map(|creds| creds.user.username.clone())
                .unwrap_or_default(),
            category_name: post
                .category_id
                .and_then(|id| self.categories.get(&id))
                .map(|category| category.name.clone()),
            comment_count: self
                .comments
                .values()
                .filter(|comment| comment.post_id == post.id)
                .count() as i64,
            created_at: post.created_at,
        }
    }

    fn comment_view(&self, comment: &Comment) -> CommentView {
        CommentView {
            comment: comment.clone(),
            author_username: self
                .users
                .get(&comment.author_id)
                .map(|creds| creds.user.username.clone())
                .unwrap_or_default(),
            post_title: self
                .posts
                .get(&comment.post_id)
                .map(|post| post.title.clone())
                .unwrap_or_default(),
        }
    }

    fn newest_first(&self, mut posts: Vec<&Post>) -> Vec<PostSummary> {
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        posts.into_iter().map(|post| self.summary(post)).collect()
    }

    fn remove_post(&mut self, post_id: i64) -> bool {
        self.likes.retain(|(post, _)| *post != post_id);
        self.saves.retain(|(post, _)| *post != post_id);
        self.comments.retain(|_, comment| comment.post_id != post_id);
        self.posts.remove(&post_id).is_some()
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store mutex poisoned")
    }

    /// Makes the next `count` slug lookups miss, as if another request
    /// inserted the slug between the check and the insert.
    pub(crate) fn hide_slugs_for_next_checks(&self, count: usize) {
        self.lock().stale_slug_checks = count;
    }

    pub(crate) fn liked_by(&self, post_id: i64) -> Vec<i64> {
        self.lock()
            .likes
            .iter()
            .filter(|(post, _)| *post == post_id)
            .map(|(_, user)| *user)
            .collect()
    }

    pub(crate) fn comment_count(&self) -> usize {
        self.lock().comments.len()
    }

    pub(crate) fn set_admin(&self, user_id: i64) {
        if let Some(creds) = self.lock().users.get_mut(&user_id) {
            creds.user.is_staff = true;
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        for creds in state.users.values() {
            if creds.user.username == input.username {
                return Err(DomainError::AlreadyExists("username".to_string()));
            }
            if creds.user.email == input.email {
                return Err(DomainError::AlreadyExists("email".to_string()));
            }
        }

        let user = User {
            id: state.next_id(),
            username: input.username,
            email: input.email,
            avatar: input.avatar,
            bio: input.bio,
            theme: Theme::default(),
            is_staff: input.is_staff,
            is_superuser: input.is_superuser,
            joined_at: Utc::now(),
        };
        state.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.lock().users.get(&id).map(|creds| creds.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|creds| creds.user.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self
            .lock()
            .users
            .values()
            .map(|creds| creds.user.clone())
            .collect();
        users.sort_by(|a, b| (b.joined_at, b.id).cmp(&(a.joined_at, a.id)));
        Ok(users)
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, DomainError> {
        let mut state = self.lock();
        for (other_id, creds) in &state.users {
            if *other_id == id {
                continue;
            }
            if creds.user.username == changes.username {
                return Err(DomainError::AlreadyExists("username".to_string()));
            }
            if creds.user.email == changes.email {
                return Err(DomainError::AlreadyExists("email".to_string()));
            }
        }

        let Some(creds) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        creds.user.username = changes.username;
        creds.user.email = changes.email;
        creds.user.avatar = changes.avatar;
        creds.user.bio = changes.bio;
        creds.user.theme = changes.theme;
        Ok(Some(creds.user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        if !state.users.contains_key(&id) {
            return Ok(false);
        }

        let liked: Vec<i64> = state
            .likes
            .iter()
            .filter(|(_, user)| *user == id)
            .map(|(post, _)| *post)
            .collect();
        for post_id in liked {
            if let Some(post) = state.posts.get_mut(&post_id) {
                post.likes = (post.likes - 1).max(0);
            }
        }
        state.likes.retain(|(_, user)| *user != id);
        state.saves.retain(|(_, user)| *user != id);
        state.comments.retain(|_, comment| comment.author_id != id);

        let owned: Vec<i64> = state
            .posts
            .values()
            .filter(|post| post.author_id == id)
            .map(|post| post.id)
            .collect();
        for post_id in owned {
            state.remove_post(post_id);
        }

        Ok(state.users.remove(&id).is_some())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create_category(&self, name: &str) -> Result<Category, DomainError> {
        let mut state = self.lock();
        if state.categories.values().any(|category| category.name == name) {
            return Err(DomainError::AlreadyExists("name".to_string()));
        }
        let category = Category {
            id: state.next_id(),
            name: name.to_string(),
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        Ok(self.lock().categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories: Vec<Category> = self.lock().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn update_category(&self, id: i64, name: &str) -> Result<Option<Category>, DomainError> {
        let mut state = self.lock();
        if state
            .categories
            .values()
            .any(|category| category.name == name && category.id != id)
        {
            return Err(DomainError::AlreadyExists("name".to_string()));
        }
        let Some(category) = state.categories.get_mut(&id) else {
            return Ok(None);
        };
        category.name = name.to_string();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        for post in state.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(state.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        if state.posts.values().any(|post| post.slug == input.slug) {
            return Err(DomainError::AlreadyExists("slug".to_string()));
        }
        if !state.users.contains_key(&input.author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }
        if let Some(category_id) = input.category_id
            && !state.categories.contains_key(&category_id)
        {
            return Err(DomainError::NotFound("category".to_string()));
        }

        let now = Utc::now();
        let post = Post {
            id: state.next_id(),
            author_id: input.author_id,
            title: input.title,
            slug: input.slug,
            content: input.content,
            image: None,
            category_id: input.category_id,
            tags: Vec::new(),
            views: 0,
            likes: 0,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.lock().posts.get(&id).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, DomainError> {
        let mut state = self.lock();
        if state.stale_slug_checks > 0 {
            state.stale_slug_checks -= 1;
            return Ok(false);
        }
        Ok(state.posts.values().any(|post| post.slug == slug))
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.title = patch.title;
        post.content = patch.content;
        post.category_id = patch.category_id;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.lock().remove_post(id))
    }

    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<PostSummary>, DomainError> {
        let state = self.lock();
        let limit = pagination.limit as usize;
        let offset = pagination.offset as usize;
        let all = state.newest_first(state.posts.values().collect());
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn total_posts(&self) -> Result<i64, DomainError> {
        Ok(self.lock().posts.len() as i64)
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeToggle>, DomainError> {
        let mut state = self.lock();
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }
        let liked = state.likes.insert((post_id, user_id));
        if !liked {
            state.likes.remove(&(post_id, user_id));
        }
        let Some(post) = state.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        post.likes = if liked {
            post.likes + 1
        } else {
            (post.likes - 1).max(0)
        };
        Ok(Some(LikeToggle {
            liked,
            likes: post.likes,
        }))
    }

    async fn toggle_save(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<SaveToggle>, DomainError> {
        let mut state = self.lock();
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }
        let saved = state.saves.insert((post_id, user_id));
        if !saved {
            state.saves.remove(&(post_id, user_id));
        }
        Ok(Some(SaveToggle { saved }))
    }

    async fn list_saved_posts(&self, user_id: i64) -> Result<Vec<PostSummary>, DomainError> {
        let state = self.lock();
        let saved = state
            .saves
            .iter()
            .filter(|(_, user)| *user == user_id)
            .filter_map(|(post, _)| state.posts.get(post))
            .collect();
        Ok(state.newest_first(saved))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<CommentView, DomainError> {
        let mut state = self.lock();
        if !state.posts.contains_key(&input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        let comment = Comment {
            id: state.next_id(),
            post_id: input.post_id,
            author_id: input.author_id,
            text: input.text,
            likes: 0,
            created_at: Utc::now(),
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(state.comment_view(&comment))
    }

    async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError> {
        let state = self.lock();
        Ok(state
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .map(|comment| state.comment_view(comment))
            .collect())
    }
}
