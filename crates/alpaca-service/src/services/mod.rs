//! Application services
//!
//! Sync units own cache keys and keep them current; services run validated
//! mutations against the backend and patch or invalidate what they touch.

pub mod auth;
pub mod blog;
pub mod channel;
pub mod comment;
pub mod context;
pub mod error;
pub mod journal;
pub mod message;
pub mod note;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

// Re-export all services for convenience
pub use auth::{AuthService, SignUpOutcome};
pub use blog::BlogService;
pub use channel::{derive_members, ChannelService};
pub use comment::CommentService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{form_message, ServiceError, ServiceResult};
pub use journal::JournalService;
pub use message::MessageService;
pub use note::NoteService;
pub use sync::{merge_insert, ChannelSync, SyncState};
