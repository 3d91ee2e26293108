//! Socket connection and its background tasks

mod realtime_socket;
mod tasks;

pub use realtime_socket::{RealtimeSocket, Subscription};
