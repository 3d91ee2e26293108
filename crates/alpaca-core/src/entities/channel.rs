//! Channel entity - a named chat room

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::timestamp::lenient_timestamp_opt;
use crate::value_objects::RecordId;

/// Channel entity
///
/// Channels are created by any signed-in user and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: RecordId,
    pub name: String,
    #[serde(default, with = "lenient_timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Channel {
    /// Create a new Channel
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: None,
        }
    }

    /// Name as shown in the sidebar (`#general`)
    pub fn display_name(&self) -> String {
        format!("#{}", self.name)
    }
}

/// Insert payload for the `channels` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewChannel {
    pub name: String,
}
