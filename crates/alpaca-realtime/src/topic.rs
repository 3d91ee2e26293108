//! Topic naming
//!
//! Message streams join `realtime:messages:<channel_id>`; socket-level frames
//! (heartbeats) use the `phoenix` topic.

use alpaca_core::RecordId;
use std::fmt;

/// Topic of socket-level frames
pub const PHOENIX_TOPIC: &str = "phoenix";

const PREFIX: &str = "realtime:";

/// A joinable topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Inserts into one channel's messages
    Messages(RecordId),
}

impl Topic {
    /// Wire name of the topic
    pub fn name(&self) -> String {
        match self {
            Self::Messages(channel_id) => format!("{PREFIX}messages:{channel_id}"),
        }
    }

    /// Parse a wire name
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(PREFIX)?;
        let (kind, id) = rest.split_once(':')?;
        match kind {
            "messages" => RecordId::parse(id).ok().map(Self::Messages),
            _ => None,
        }
    }

    /// Channel this topic is scoped to
    pub fn channel_id(&self) -> RecordId {
        match self {
            Self::Messages(channel_id) => *channel_id,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
