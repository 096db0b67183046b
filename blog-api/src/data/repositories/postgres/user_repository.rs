use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::user_repository::{NewUser, UserChanges, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{Theme, User};

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    avatar: Option<String>,
    bio: Option<String>,
    theme: String,
    is_staff: bool,
    is_superuser: bool,
    joined_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, avatar, bio, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, avatar, bio, theme, is_staff, is_superuser, joined_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.avatar)
        .bind(&input.bio)
        .bind(input.is_staff)
        .bind(input.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        map_row_to_user(row)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
            id,
            username,
            email,
            avatar,
            bio,
            theme,
            is_staff,
            is_superuser,
            joined_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            SELECT
            id,
            username,
            email,
            avatar,
            bio,
            theme,
            is_staff,
            is_superuser,
            joined_at,
            password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        if let Some(r) = row {
            Ok(Some(UserCredentials {
                user: map_row_to_user(r.user)?,
                password_hash: r.password_hash,
            }))
        } else {
            Ok(None)
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id,
                username,
                email,
                avatar,
                bio,
                theme,
                is_staff,
                is_superuser,
                joined_at
            FROM users
            ORDER BY joined_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        rows.into_iter().map(map_row_to_user).collect()
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username = $2,
                email = $3,
                avatar = $4,
                bio = $5,
                theme = $6
            WHERE id = $1
            RETURNING id, username, email, avatar, bio, theme, is_staff, is_superuser, joined_at
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.avatar)
        .bind(&changes.bio)
        .bind(changes.theme.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_user_db_error)?;

        // Locking the row blocks concurrent inserts that reference this user.
        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_user_db_error)?;
        if locked.is_none() {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE posts
            SET likes = GREATEST(likes - 1, 0)
            WHERE id IN (SELECT post_id FROM post_likes WHERE user_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_user_db_error)?;

        for statement in [
            "DELETE FROM post_likes WHERE user_id = $1 OR post_id IN (SELECT id FROM posts WHERE author_id = $1)",
            "DELETE FROM post_saves WHERE user_id = $1 OR post_id IN (SELECT id FROM posts WHERE author_id = $1)",
            "DELETE FROM comments WHERE author_id = $1 OR post_id IN (SELECT id FROM posts WHERE author_id = $1)",
            "DELETE FROM posts WHERE author_id = $1",
        ] {
            sqlx::query(statement)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_user_db_error)?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_user_db_error)?;

        tx.commit().await.map_err(map_user_db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_row_to_user(row: UserRow) -> Result<User, DomainError> {
    let theme = row
        .theme
        .parse::<Theme>()
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;

    Ok(User {
        id: row.id,
        username: row.username,
        email: row.email,
        avatar: row.avatar,
        bio: row.bio,
        theme,
        is_staff: row.is_staff,
        is_superuser: row.is_superuser,
        joined_at: row.joined_at,
    })
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_username_key") => "username",
            Some("users_email_key") => "email",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
