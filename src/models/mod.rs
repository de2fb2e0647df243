pub mod comment;
pub mod post;
pub mod token;
pub mod user;

pub use comment::{unknown_post, Comment, CommentChanges, NewComment};
pub use post::{NewPost, Post, PostChanges};
pub use token::Token;
pub use user::{username_taken, NewUser, User, UserChanges};
