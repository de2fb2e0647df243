//! Persistence interface.
//!
//! Handlers only talk to `dyn Store`. `PgStore` is the production backend;
//! `MemoryStore` keeps everything in process and backs the test suite.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{
    Comment, CommentChanges, NewComment, NewPost, NewUser, Post, PostChanges, Token, User,
    UserChanges,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), AppError>;

    /// All users, ordered by id.
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// Fails with the duplicate-username validation error if the name is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, AppError>;
    /// Removes the user together with its token. Returns `false` if it did not exist.
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;

    /// Returns the user's token, creating it first if needed.
    ///
    /// Must be atomic: concurrent calls for the same user all observe one key.
    async fn get_or_create_token(&self, user_id: i64) -> Result<Token, AppError>;
    async fn find_user_by_token(&self, key: &str) -> Result<Option<User>, AppError>;

    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, AppError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError>;
    async fn create_post(&self, post: NewPost) -> Result<Post, AppError>;
    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Option<Post>, AppError>;
    /// Removes the post and its comments.
    async fn delete_post(&self, id: i64) -> Result<bool, AppError>;

    /// All comments, newest first.
    async fn list_comments(&self) -> Result<Vec<Comment>, AppError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, AppError>;
    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError>;
    async fn update_comment(
        &self,
        id: i64,
        changes: CommentChanges,
    ) -> Result<Option<Comment>, AppError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, AppError>;
}
