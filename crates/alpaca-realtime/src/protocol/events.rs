//! Realtime event names
//!
//! Defines the `event` values exchanged on the socket.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Realtime socket events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketEvent {
    /// Join a topic (client)
    #[serde(rename = "phx_join")]
    Join,
    /// Leave a topic (client)
    #[serde(rename = "phx_leave")]
    Leave,
    /// Reply to a client frame carrying the same ref (server)
    #[serde(rename = "phx_reply")]
    Reply,
    /// Topic crashed on the server (server)
    #[serde(rename = "phx_error")]
    Error,
    /// Topic closed by the server (server)
    #[serde(rename = "phx_close")]
    Close,
    /// Keep-alive on the `phoenix` topic (client)
    #[serde(rename = "heartbeat")]
    Heartbeat,
    /// Row change matching a joined filter (server)
    #[serde(rename = "postgres_changes")]
    PostgresChanges,
    /// Subscription status notices (server)
    #[serde(rename = "system")]
    System,
}

impl SocketEvent {
    /// Wire name of the event
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Join => "phx_join",
            Self::Leave => "phx_leave",
            Self::Reply => "phx_reply",
            Self::Error => "phx_error",
            Self::Close => "phx_close",
            Self::Heartbeat => "heartbeat",
            Self::PostgresChanges => "postgres_changes",
            Self::System => "system",
        }
    }

    /// Parse a wire name; unknown events yield `None`
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "phx_join" => Some(Self::Join),
            "phx_leave" => Some(Self::Leave),
            "phx_reply" => Some(Self::Reply),
            "phx_error" => Some(Self::Error),
            "phx_close" => Some(Self::Close),
            "heartbeat" => Some(Self::Heartbeat),
            "postgres_changes" => Some(Self::PostgresChanges),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// Check if the client sends this event
    #[must_use]
    pub const fn is_client_event(self) -> bool {
        matches!(self, Self::Join | Self::Leave | Self::Heartbeat)
    }
}

impl fmt::Display for SocketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
