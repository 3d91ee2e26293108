//! # alpaca-core
//!
//! Domain layer containing entities, value objects, ports, and change events.
//! This crate has no dependencies on infrastructure (HTTP, websockets, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    is_html_upload, parse_tag_list, sort_chronologically, stored_file_name, AuthorProfile,
    BlogPost, BlogPostUpdate, Channel, Comment, CommentParent, JournalDraft, JournalEntry, Message,
    MessagePatch, NewBlogPost, NewChannel, NewComment, NewMessage, NewNote, Note, Profile, Session,
    Tag, HTML_CONTENT_TYPE, MAX_TITLE_LENGTH, UNKNOWN_USER_LABEL,
};
pub use error::DomainError;
pub use events::{ChangeEvent, ChangeKind};
pub use traits::{
    AuthGateway, BlogRepository, ChannelRepository, CommentRepository, FileStorage,
    JournalRepository, MessageFeed, MessageRepository, MessageStream, NoteRepository, RepoResult,
    StreamHandle,
};
pub use value_objects::{parse_timestamp, RecordId, RecordIdParseError};
