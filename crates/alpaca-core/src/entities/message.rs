//! Message entity - a chat message with its joined author profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::timestamp::{lenient_timestamp, null_as_empty};
use crate::value_objects::RecordId;

/// Label shown when a message carries no author profile
pub const UNKNOWN_USER_LABEL: &str = "Unknown User";

/// Author display fields attached to a row through the `profiles` join
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorProfile {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl AuthorProfile {
    /// Create a profile with a username and no avatar
    #[must_use]
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            avatar_url: None,
        }
    }

    /// Username if present and not blank
    pub fn display_name(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Message entity
///
/// `profile` is populated by the bulk read join and is usually absent on
/// messages delivered by the realtime feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: RecordId,
    pub channel_id: RecordId,
    pub user_id: RecordId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, rename = "profiles", skip_serializing_if = "Option::is_none")]
    pub profile: Option<AuthorProfile>,
}

impl Message {
    /// Create a new Message without an author profile
    pub fn new(
        id: RecordId,
        channel_id: RecordId,
        user_id: RecordId,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            channel_id,
            user_id,
            content: content.into(),
            created_at,
            profile: None,
        }
    }

    /// Attach an author profile
    #[must_use]
    pub fn with_profile(mut self, profile: AuthorProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Author label for display, falling back to [`UNKNOWN_USER_LABEL`]
    pub fn author_label(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(AuthorProfile::display_name)
            .unwrap_or(UNKNOWN_USER_LABEL)
    }

    /// Avatar URL if the profile carries one
    pub fn avatar_url(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.avatar_url.as_deref())
    }

    /// Uppercased first character of the author label (avatar fallback)
    pub fn avatar_initial(&self) -> char {
        self.author_label()
            .chars()
            .next()
            .map_or('?', |c| c.to_uppercase().next().unwrap_or(c))
    }

    /// Check whether `user_id` wrote this message
    #[inline]
    pub fn is_authored_by(&self, user_id: RecordId) -> bool {
        self.user_id == user_id
    }

    /// Check if message content is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Get a truncated preview of the message (for notifications)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }
}

/// Stable sort by creation time; equal timestamps keep their delivered order
pub fn sort_chronologically(messages: &mut [Message]) {
    messages.sort_by_key(|m| m.created_at);
}

/// Insert payload for the `messages` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub channel_id: RecordId,
    pub content: String,
    pub user_id: RecordId,
}

/// Update payload for the `messages` table (content is the only mutable column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePatch {
    pub content: String,
}
