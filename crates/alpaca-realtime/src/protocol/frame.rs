//! Socket frame format
//!
//! Every text frame on the socket is a JSON object of this shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{JoinPayload, SocketEvent};
use crate::topic::PHOENIX_TOPIC;

/// Socket frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    /// Client-chosen reference echoed back in `phx_reply`
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl Frame {
    // === Client Frames ===

    /// Build a frame for a known event
    #[must_use]
    pub fn new(topic: impl Into<String>, event: SocketEvent, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            event: event.as_str().to_string(),
            payload,
            reference: None,
        }
    }

    /// Attach a ref
    #[must_use]
    pub fn with_ref(mut self, reference: impl ToString) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    /// Keep-alive frame
    #[must_use]
    pub fn heartbeat(reference: u64) -> Self {
        Self::new(PHOENIX_TOPIC, SocketEvent::Heartbeat, Value::Object(Default::default()))
            .with_ref(reference)
    }

    /// Join frame for a topic
    #[must_use]
    pub fn join(topic: &str, payload: &JoinPayload, reference: u64) -> Self {
        let payload = serde_json::to_value(payload).unwrap_or_default();
        Self::new(topic, SocketEvent::Join, payload).with_ref(reference)
    }

    /// Leave frame for a topic
    #[must_use]
    pub fn leave(topic: &str, reference: u64) -> Self {
        Self::new(topic, SocketEvent::Leave, Value::Object(Default::default()))
            .with_ref(reference)
    }

    // === Inspection ===

    /// The event, if it is one this client knows
    pub fn kind(&self) -> Option<SocketEvent> {
        SocketEvent::parse(&self.event)
    }

    /// Check if the frame belongs to the socket-level `phoenix` topic
    pub fn is_phoenix(&self) -> bool {
        self.topic == PHOENIX_TOPIC
    }

    /// Decode the payload into a typed struct
    pub fn payload_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
