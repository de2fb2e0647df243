use async_trait::async_trait;
use sqlx::PgPool;

use super::Store;
use crate::error::AppError;
use crate::models::{
    unknown_post, username_taken, Comment, CommentChanges, NewComment, NewPost, NewUser, Post,
    PostChanges, Token, User, UserChanges,
};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, date_joined, password_hash";
const POST_COLUMNS: &str = "id, title, content, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, post_id, content, created_at, updated_at";

/// PostgreSQL-backed `Store`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))
    }
}

/// A unique violation on write can only come from `users.username`.
fn user_write_error(error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => username_taken(),
        _ => error.into(),
    }
}

/// Maps the `comments.post_id` foreign key violation to a field error.
fn comment_write_error(error: sqlx::Error, post_id: Option<i64>) -> AppError {
    match (&error, post_id) {
        (sqlx::Error::Database(db), Some(post_id)) if db.is_foreign_key_violation() => {
            unknown_post(post_id)
        }
        _ => error.into(),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, first_name, last_name, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.username)
            .bind(user.email)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(user_write_error)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users
             SET username = COALESCE($1, username),
                 email = COALESCE($2, email),
                 first_name = COALESCE($3, first_name),
                 last_name = COALESCE($4, last_name),
                 password_hash = COALESCE($5, password_hash)
             WHERE id = $6
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(changes.username)
            .bind(changes.email)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.password_hash)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(user_write_error)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        // auth_tokens rows go with the user (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_or_create_token(&self, user_id: i64) -> Result<Token, AppError> {
        // No-op update so RETURNING yields the existing row on conflict.
        let token = sqlx::query_as::<_, Token>(
            "INSERT INTO auth_tokens (key, user_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING key, user_id, created",
        )
        .bind(Token::generate_key())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(token)
    }

    async fn find_user_by_token(&self, key: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.date_joined, u.password_hash
             FROM users u
             JOIN auth_tokens t ON t.user_id = u.id
             WHERE t.key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let sql = format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, AppError> {
        let sql = format!(
            "INSERT INTO posts (title, content) VALUES ($1, $2) RETURNING {}",
            POST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(post.title)
            .bind(post.content)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Option<Post>, AppError> {
        let sql = format!(
            "UPDATE posts
             SET title = COALESCE($1, title),
                 content = COALESCE($2, content),
                 updated_at = NOW()
             WHERE id = $3
             RETURNING {}",
            POST_COLUMNS
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(changes.title)
            .bind(changes.content)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_post(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self) -> Result<Vec<Comment>, AppError> {
        let sql = format!(
            "SELECT {} FROM comments ORDER BY created_at DESC, id DESC",
            COMMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let sql = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let sql = format!(
            "INSERT INTO comments (post_id, content) VALUES ($1, $2) RETURNING {}",
            COMMENT_COLUMNS
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(comment.post_id)
            .bind(comment.content)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| comment_write_error(e, Some(comment.post_id)))
    }

    async fn update_comment(
        &self,
        id: i64,
        changes: CommentChanges,
    ) -> Result<Option<Comment>, AppError> {
        let sql = format!(
            "UPDATE comments
             SET post_id = COALESCE($1, post_id),
                 content = COALESCE($2, content),
                 updated_at = NOW()
             WHERE id = $3
             RETURNING {}",
            COMMENT_COLUMNS
        );
        let post_id = changes.post_id;
        sqlx::query_as::<_, Comment>(&sql)
            .bind(changes.post_id)
            .bind(changes.content)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| comment_write_error(e, post_id))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
