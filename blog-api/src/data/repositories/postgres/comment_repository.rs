use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentViewRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    likes: i64,
    created_at: DateTime<Utc>,
    author_username: String,
    post_title: String,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<CommentView, DomainError> {
        let row = sqlx::query_as::<_, CommentViewRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, author_id, text, likes, created_at
            )
            SELECT
                i.id,
                i.post_id,
                i.author_id,
                i.text,
                i.likes,
                i.created_at,
                u.username AS author_username,
                p.title AS post_title
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            JOIN posts p ON p.id = i.post_id
            "#,
        )
        .bind(input.post_id)
        .bind(input.author_id)
        .bind(&input.text)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(map_row_to_view(row))
    }

    async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError> {
        let rows = sqlx::query_as::<_, CommentViewRow>(
            r#"
            SELECT
                cm.id,
                cm.post_id,
                cm.author_id,
                cm.text,
                cm.likes,
                cm.created_at,
                u.username AS author_username,
                p.title AS post_title
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            JOIN posts p ON p.id = cm.post_id
            WHERE cm.post_id = $1
            ORDER BY cm.created_at, cm.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(map_row_to_view).collect())
    }
}

fn map_row_to_view(row: CommentViewRow) -> CommentView {
    CommentView {
        comment: Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            text: row.text,
            likes: row.likes,
            created_at: row.created_at,
        },
        author_username: row.author_username,
        post_title: row.post_title,
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("comments_post_id_fkey") => "post",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
