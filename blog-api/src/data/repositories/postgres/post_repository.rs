use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::data::post_repository::{NewPost, Pagination, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{LikeToggle, Post, PostSummary, SaveToggle};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    title: String,
    slug: String,
    content: String,
    image: Option<String>,
    category_id: Option<i64>,
    tags: Vec<String>,
    views: i64,
    likes: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
    id: i64,
    title: String,
    author_username: String,
    category_name: Option<String>,
    comment_count: i64,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (author_id, title, slug, content, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, title, slug, content, image, category_id, tags,
                      views, likes, created_at, updated_at
            "#,
        )
        .bind(input.author_id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(input.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(map_row_to_post(row))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
            id,
            author_id,
            title,
            slug,
            content,
            image,
            category_id,
            tags,
            views,
            likes,
            created_at,
            updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(map_row_to_post))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM posts WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET title = $2,
                content = $3,
                category_id = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, author_id, title, slug, content, image, category_id, tags,
                      views, likes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(patch.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(map_row_to_post))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        if lock_post(&mut tx, id).await?.is_none() {
            return Ok(false);
        }

        for statement in [
            "DELETE FROM post_likes WHERE post_id = $1",
            "DELETE FROM post_saves WHERE post_id = $1",
            "DELETE FROM comments WHERE post_id = $1",
        ] {
            sqlx::query(statement)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_post_db_error)?;
        }

        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        tx.commit().await.map_err(map_post_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, pagination: Pagination) -> Result<Vec<PostSummary>, DomainError> {
        let limit = i64::from(pagination.limit);
        let offset = i64::from(pagination.offset);

        let rows = sqlx::query_as::<_, PostSummaryRow>(
            r#"
            SELECT
                p.id,
                p.title,
                u.username AS author_username,
                c.name AS category_name,
                (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count,
                p.created_at
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN categories c ON c.id = p.category_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $1
            OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(map_row_to_summary).collect())
    }

    async fn total_posts(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeToggle>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        if lock_post(&mut tx, post_id).await?.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?
            .rows_affected()
            > 0;

        let likes = if removed {
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE posts
                SET likes = GREATEST(likes - 1, 0)
                WHERE id = $1
                RETURNING likes
                "#,
            )
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_post_db_error)?
        } else {
            sqlx::query("INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_post_db_error)?;

            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE posts
                SET likes = likes + 1
                WHERE id = $1
                RETURNING likes
                "#,
            )
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_post_db_error)?
        };

        tx.commit().await.map_err(map_post_db_error)?;
        Ok(Some(LikeToggle {
            liked: !removed,
            likes,
        }))
    }

    async fn toggle_save(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<SaveToggle>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        if lock_post(&mut tx, post_id).await?.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM post_saves WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?
            .rows_affected()
            > 0;

        if !removed {
            sqlx::query("INSERT INTO post_saves (post_id, user_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_post_db_error)?;
        }

        tx.commit().await.map_err(map_post_db_error)?;
        Ok(Some(SaveToggle { saved: !removed }))
    }

    async fn list_saved_posts(&self, user_id: i64) -> Result<Vec<PostSummary>, DomainError> {
        let rows = sqlx::query_as::<_, PostSummaryRow>(
            r#"
            SELECT
                p.id,
                p.title,
                u.username AS author_username,
                c.name AS category_name,
                (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count,
                p.created_at
            FROM post_saves s
            JOIN posts p ON p.id = s.post_id
            JOIN users u ON u.id = p.author_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE s.user_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(map_row_to_summary).collect())
    }
}

/// Row lock serializing toggles and deletes on one post.
async fn lock_post(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
) -> Result<Option<i64>, DomainError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
        .bind(post_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_post_db_error)
}

fn map_row_to_post(row: PostRow) -> Post {
    Post {
        id: row.id,
        author_id: row.author_id,
        title: row.title,
        slug: row.slug,
        content: row.content,
        image: row.image,
        category_id: row.category_id,
        tags: row.tags,
        views: row.views,
        likes: row.likes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn map_row_to_summary(row: PostSummaryRow) -> PostSummary {
    PostSummary {
        id: row.id,
        title: row.title,
        author_username: row.author_username,
        category_name: row.category_name,
        comment_count: row.comment_count,
        created_at: row.created_at,
    }
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") if db_err.constraint() == Some("posts_slug_key") => {
                return DomainError::AlreadyExists("slug".to_string());
            }
            Some("23503") => {
                let resource = match db_err.constraint() {
                    Some("posts_category_id_fkey") => "category",
                    _ => "author",
                };
                return DomainError::NotFound(resource.to_string());
            }
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
