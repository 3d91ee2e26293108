//! # alpaca-service
//!
//! Application layer: the channel sync unit, mutation services, validated
//! forms, view models and navigation routes.
//!
//! Everything runs against a [`ServiceContext`], which holds the backend
//! ports and the shared query cache.
//!
//! ```ignore
//! let ctx = ServiceContext::connect(&ClientConfig::from_env()?)?;
//! let mut sync = ChannelSync::new(ctx.clone());
//! sync.select(Some(channel_id)).await?;
//! MessageService::new(&ctx).send(channel_id, "gm").await?;
//! let view = sync.view(ctx.current_user());
//! ```

pub mod dto;
pub mod routes;
pub mod services;

pub use routes::Route;
pub use services::{
    AuthService, BlogService, ChannelService, ChannelSync, CommentService, JournalService,
    MessageService, NoteService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, SignUpOutcome, SyncState,
};
