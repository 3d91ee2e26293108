//! # alpaca-realtime
//!
//! Realtime client for the backend's change feed.
//!
//! ## Overview
//!
//! - [`protocol`]: JSON frames (`topic`, `event`, `payload`, `ref`) and payloads
//! - [`RealtimeSocket`]: one websocket with reader, writer and heartbeat tasks
//!   and a reference-counted topic registry
//! - [`RealtimeMessageFeed`]: the `MessageFeed` port over the socket
//!
//! ## Usage
//!
//! ```rust,ignore
//! use alpaca_core::MessageFeed;
//! use alpaca_realtime::RealtimeMessageFeed;
//!
//! let feed = RealtimeMessageFeed::new(config, session);
//! let mut stream = feed.open(channel_id).await?;
//! while let Some(message) = stream.events.recv().await {
//!     println!("{}: {}", message.author_label(), message.content);
//! }
//! feed.close(&stream.handle).await?;
//! ```

pub mod feed;
pub mod protocol;
pub mod socket;
pub mod topic;

pub use feed::RealtimeMessageFeed;
pub use protocol::{Frame, SocketEvent};
pub use socket::{RealtimeSocket, Subscription};
pub use topic::{Topic, PHOENIX_TOPIC};
