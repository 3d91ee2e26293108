//! Domain entities - core business objects

mod blog;
mod channel;
mod comment;
mod journal;
mod message;
mod note;
mod profile;
mod session;

pub use blog::{parse_tag_list, BlogPost, BlogPostUpdate, NewBlogPost, Tag, MAX_TITLE_LENGTH};
pub use channel::{Channel, NewChannel};
pub use comment::{Comment, CommentParent, NewComment};
pub use journal::{JournalDraft, JournalEntry};
pub use message::{
    sort_chronologically, AuthorProfile, Message, MessagePatch, NewMessage, UNKNOWN_USER_LABEL,
};
pub use note::{is_html_upload, stored_file_name, NewNote, Note, HTML_CONTENT_TYPE};
pub use profile::Profile;
pub use session::Session;
