use std::sync::Arc;

use sqlx::PgPool;

use repositories::postgres::category_repository::PostgresCategoryRepository;
use repositories::postgres::comment_repository::PostgresCommentRepository;
use repositories::postgres::post_repository::PostgresPostRepository;
use repositories::postgres::user_repository::PostgresUserRepository;

pub(crate) mod category_repository;
pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod user_repository;

use category_repository::CategoryRepository;
use comment_repository::CommentRepository;
use post_repository::PostRepository;
use user_repository::UserRepository;

/// Storage handles shared by the services.
#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) users: Arc<dyn UserRepository>,
    pub(crate) categories: Arc<dyn CategoryRepository>,
    pub(crate) posts: Arc<dyn PostRepository>,
    pub(crate) comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub(crate) fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool)),
        }
    }

    #[cfg(test)]
    pub(crate) fn in_memory(store: repositories::memory::MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            categories: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
            comments: Arc::new(store),
        }
    }
}
