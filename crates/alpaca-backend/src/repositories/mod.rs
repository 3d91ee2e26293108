//! Repository implementations
//!
//! REST implementations of the repository traits defined in alpaca-core.
//! Each repository handles the requests for one backend table family.

mod blog;
mod channel;
mod comment;
mod journal;
mod message;
mod note;

pub use blog::RestBlogRepository;
pub use channel::RestChannelRepository;
pub use comment::RestCommentRepository;
pub use journal::RestJournalRepository;
pub use message::RestMessageRepository;
pub use note::RestNoteRepository;
