//! Data transfer objects
//!
//! This module provides:
//! - Form DTOs with validation
//! - View models rendered by the UI

pub mod requests;
pub mod views;

pub use requests::{
    CreateBlogPostRequest, CreateChannelRequest, JournalRequest, NoteFile, SignInRequest,
    SignUpRequest, UpdateBlogPostRequest, UploadMode, UploadNoteRequest,
};
pub use views::{
    edited_content, EditAction, MemberListView, MemberRow, MessageEditor, MessageListView,
    MessageRow,
};
