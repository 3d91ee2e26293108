//! Realtime wire protocol

mod events;
mod frame;
mod payloads;

pub use events::SocketEvent;
pub use frame::Frame;
pub use payloads::{ChangesPayload, JoinConfig, JoinPayload, PostgresChangeFilter, ReplyPayload};
