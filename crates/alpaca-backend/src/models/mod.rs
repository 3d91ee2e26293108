//! Wire models for backend rows and payloads

mod auth;
mod blog;
mod message;

pub use auth::{PasswordCredentials, RefreshGrant, SignUpData, TokenResponse};
pub use blog::{BlogPostRow, PostIdRow, PostTagRow, TagInsert, TagLinkInsert, BLOG_POST_SELECT};
pub use message::{AuthorRow, ProfileRow, AUTHOR_SELECT, MESSAGE_SELECT};

/// Select list for rows joined with their author's username
pub const WITH_AUTHOR_SELECT: &str = "*,profiles(username)";
