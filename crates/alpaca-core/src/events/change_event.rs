//! Change events - row changes delivered by the realtime feed

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::timestamp::lenient_timestamp_opt;

/// Kind of row change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// A single row change on a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub schema: String,
    pub table: String,
    #[serde(default)]
    pub record: Option<serde_json::Value>,
    #[serde(default)]
    pub old_record: Option<serde_json::Value>,
    #[serde(default, with = "lenient_timestamp_opt")]
    pub commit_timestamp: Option<DateTime<Utc>>,
}

impl ChangeEvent {
    /// Check whether the change is an insert on `table`
    pub fn is_insert_on(&self, table: &str) -> bool {
        self.kind == ChangeKind::Insert && self.table == table
    }

    /// Decode the new row into a typed entity
    pub fn decode_record<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        let record = self
            .record
            .clone()
            .ok_or_else(|| DomainError::Decode(format!("{} event without record", self.kind.as_str())))?;
        serde_json::from_value(record).map_err(|e| DomainError::Decode(e.to_string()))
    }
}
