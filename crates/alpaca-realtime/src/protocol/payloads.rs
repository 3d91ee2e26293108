//! Frame payloads
//!
//! Typed payloads for the events the client sends and consumes.

use alpaca_core::events::ChangeEvent;
use alpaca_core::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Row change filter requested at join time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresChangeFilter {
    pub event: String,
    pub schema: String,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl PostgresChangeFilter {
    /// Inserts into `public.messages` for one channel
    #[must_use]
    pub fn message_inserts(channel_id: RecordId) -> Self {
        Self {
            event: "INSERT".to_string(),
            schema: "public".to_string(),
            table: "messages".to_string(),
            filter: Some(format!("channel_id=eq.{channel_id}")),
        }
    }
}

/// Join configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JoinConfig {
    #[serde(default)]
    pub postgres_changes: Vec<PostgresChangeFilter>,
}

/// `phx_join` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPayload {
    pub config: JoinConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl JoinPayload {
    /// Join payload subscribing to inserts on a channel's messages
    #[must_use]
    pub fn message_inserts(channel_id: RecordId, access_token: Option<String>) -> Self {
        Self {
            config: JoinConfig {
                postgres_changes: vec![PostgresChangeFilter::message_inserts(channel_id)],
            },
            access_token,
        }
    }
}

/// `phx_reply` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyPayload {
    pub status: String,
    #[serde(default)]
    pub response: Value,
}

impl ReplyPayload {
    /// Successful reply
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            response: Value::Object(Default::default()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Human readable reason carried by an error reply
    pub fn reason(&self) -> String {
        self.response
            .get("reason")
            .and_then(Value::as_str)
            .map_or_else(|| self.response.to_string(), str::to_string)
    }
}

/// `postgres_changes` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangesPayload {
    pub data: ChangeEvent,
}
