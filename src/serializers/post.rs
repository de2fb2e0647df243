use serde::Deserialize;
use validator::Validate;

use super::{check, required};
use crate::error::AppError;
use crate::models::{NewPost, PostChanges};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PostPayload {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Ensure this field has between 1 and 200 characters."
    ))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub content: Option<String>,
}

impl PostPayload {
    /// For create and full update: every field must be present.
    pub fn into_new_post(self) -> Result<NewPost, AppError> {
        let mut errors = check(&self);
        let title = required(&mut errors, "title", self.title);
        let content = required(&mut errors, "content", self.content);
        match (title, content) {
            (Some(title), Some(content)) if errors.is_empty() => Ok(NewPost { title, content }),
            _ => Err(AppError::Validation(errors)),
        }
    }

    /// For partial update: only supplied fields are validated and changed.
    pub fn into_changes(self) -> Result<PostChanges, AppError> {
        check(&self).into_result()?;
        Ok(PostChanges {
            title: self.title,
            content: self.content,
        })
    }
}
