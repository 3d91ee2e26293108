//! Ports implemented by the backend and realtime crates

mod repositories;
mod services;

pub use repositories::{
    BlogRepository, ChannelRepository, CommentRepository, JournalRepository, MessageRepository,
    NoteRepository, RepoResult,
};
pub use services::{AuthGateway, FileStorage, MessageFeed, MessageStream, StreamHandle};
