use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::Store;
use crate::error::AppError;
use crate::models::{
    unknown_post, username_taken, Comment, CommentChanges, NewComment, NewPost, NewUser, Post,
    PostChanges, Token, User, UserChanges,
};

#[derive(Default)]
struct State {
    users: BTreeMap<i64, User>,
    /// Keyed by owning user id, which keeps one token per user.
    tokens: HashMap<i64, Token>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    last_user_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

impl State {
    fn username_in_use(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|user| user.username == username && Some(user.id) != except)
    }
}

/// In-process `Store`. Every operation runs under one mutex, so each is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError("memory store lock poisoned".into()))
    }
}

/// Newest first; equal timestamps fall back to the higher id.
fn newest_first<T>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> (i64, i64)) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.state().map(|_| ())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.state()?.users.values().cloned().collect())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.state()?.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .state()?
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.state()?;
        if state.username_in_use(&user.username, None) {
            return Err(username_taken());
        }
        state.last_user_id += 1;
        let user = User {
            id: state.last_user_id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: Utc::now(),
            password_hash: user.password_hash,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut state = self.state()?;
        if let Some(username) = &changes.username {
            if state.username_in_use(username, Some(id)) {
                return Err(username_taken());
            }
        }
        Ok(state.users.get_mut(&id).map(|user| {
            changes.apply(user);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.state()?;
        state.tokens.remove(&id);
        Ok(state.users.remove(&id).is_some())
    }

    async fn get_or_create_token(&self, user_id: i64) -> Result<Token, AppError> {
        let mut state = self.state()?;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::not_found());
        }
        Ok(state
            .tokens
            .entry(user_id)
            .or_insert_with(|| Token::new(user_id))
            .clone())
    }

    async fn find_user_by_token(&self, key: &str) -> Result<Option<User>, AppError> {
        let state = self.state()?;
        Ok(state
            .tokens
            .values()
            .find(|token| token.key == key)
            .and_then(|token| state.users.get(&token.user_id))
            .cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        let state = self.state()?;
        Ok(newest_first(state.posts.values().cloned(), |post| {
            (post.created_at.timestamp_micros(), post.id)
        }))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self.state()?.posts.get(&id).cloned())
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, AppError> {
        let mut state = self.state()?;
        state.last_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: state.last_post_id,
            title: post.title,
            content: post.content,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: i64, changes: PostChanges) -> Result<Option<Post>, AppError> {
        let mut state = self.state()?;
        Ok(state.posts.get_mut(&id).map(|post| {
            if let Some(title) = changes.title {
                post.title = title;
            }
            if let Some(content) = changes.content {
                post.content = content;
            }
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.state()?;
        state.comments.retain(|_, comment| comment.post_id != id);
        Ok(state.posts.remove(&id).is_some())
    }

    async fn list_comments(&self) -> Result<Vec<Comment>, AppError> {
        let state = self.state()?;
        Ok(newest_first(state.comments.values().cloned(), |comment| {
            (comment.created_at.timestamp_micros(), comment.id)
        }))
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, AppError> {
        Ok(self.state()?.comments.get(&id).cloned())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let mut state = self.state()?;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(unknown_post(comment.post_id));
        }
        state.last_comment_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: state.last_comment_id,
            post_id: comment.post_id,
            content: comment.content,
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        id: i64,
        changes: CommentChanges,
    ) -> Result<Option<Comment>, AppError> {
        let mut state = self.state()?;
        if let Some(post_id) = changes.post_id {
            if !state.posts.contains_key(&post_id) {
                return Err(unknown_post(post_id));
            }
        }
        Ok(state.comments.get_mut(&id).map(|comment| {
            if let Some(post_id) = changes.post_id {
                comment.post_id = post_id;
            }
            if let Some(content) = changes.content {
                comment.content = content;
            }
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.state()?.comments.remove(&id).is_some())
    }
}
