use serde::Deserialize;
use validator::Validate;

use super::{check, required};
use crate::error::AppError;
use crate::models::{unknown_post, CommentChanges, NewComment};
use crate::store::Store;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CommentPayload {
    /// Id of the post being commented on.
    pub post: Option<i64>,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Ensure this field has between 1 and 1000 characters."
    ))]
    pub content: Option<String>,
}

impl CommentPayload {
    pub fn into_new_comment(self) -> Result<NewComment, AppError> {
        let mut errors = check(&self);
        let post = required(&mut errors, "post", self.post);
        let content = required(&mut errors, "content", self.content);
        match (post, content) {
            (Some(post_id), Some(content)) if errors.is_empty() => {
                Ok(NewComment { post_id, content })
            }
            _ => Err(AppError::Validation(errors)),
        }
    }

    pub fn into_changes(self) -> Result<CommentChanges, AppError> {
        check(&self).into_result()?;
        Ok(CommentChanges {
            post_id: self.post,
            content: self.content,
        })
    }
}

/// Resolves the `post` reference the way a related-field lookup would.
pub async fn ensure_post_exists(store: &dyn Store, post_id: i64) -> Result<(), AppError> {
    match store.get_post(post_id).await? {
        Some(_) => Ok(()),
        None => Err(unknown_post(post_id)),
    }
}
