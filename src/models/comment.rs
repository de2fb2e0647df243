use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, FieldErrors};

/// A comment attached to a post. Lists are ordered newest first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    /// Id of the post this comment belongs to; exposed as `post`.
    #[serde(rename = "post")]
    pub post_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommentChanges {
    pub post_id: Option<i64>,
    pub content: Option<String>,
}

/// The validation error reported when `post` does not reference an existing post.
pub fn unknown_post(post_id: i64) -> AppError {
    AppError::Validation(FieldErrors::single(
        "post",
        format!("Invalid pk \"{}\" - object does not exist.", post_id),
    ))
}

impl From<NewComment> for CommentChanges {
    fn from(comment: NewComment) -> Self {
        Self {
            post_id: Some(comment.post_id),
            content: Some(comment.content),
        }
    }
}
