//! Journal entity - a user's trading journal entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::{AuthorProfile, UNKNOWN_USER_LABEL};
use crate::value_objects::timestamp::{lenient_timestamp, lenient_timestamp_opt};
use crate::value_objects::RecordId;

/// Journal entry joined with its author's username
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: RecordId,
    pub user_id: RecordId,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "lenient_timestamp_opt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "profiles", skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorProfile>,
}

impl JournalEntry {
    /// Author username or the unknown-user fallback
    pub fn author_label(&self) -> &str {
        self.author
            .as_ref()
            .and_then(AuthorProfile::display_name)
            .unwrap_or(UNKNOWN_USER_LABEL)
    }

    /// Body text, empty when the column is null
    pub fn body(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: RecordId) -> bool {
        self.user_id == user_id
    }
}

/// Insert/update payload for the `journals` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalDraft {
    pub title: String,
    pub content: String,
    pub user_id: RecordId,
}
