//! Profile entity - public author information

use serde::{Deserialize, Serialize};

use super::message::{AuthorProfile, Message, UNKNOWN_USER_LABEL};
use crate::value_objects::RecordId;

/// A user's public profile row
///
/// Channel members are profiles derived from message authorship; there is
/// no presence guarantee behind them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: RecordId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Profile {
    /// Build the member profile of a message author, if the message carries one
    pub fn from_message(message: &Message) -> Option<Self> {
        message.profile.as_ref().map(|author| Self {
            id: message.user_id,
            username: author.username.clone(),
            avatar_url: author.avatar_url.clone(),
        })
    }

    /// Username or the unknown-user fallback
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_USER_LABEL)
    }

    /// Author display fields without the id
    pub fn author(&self) -> AuthorProfile {
        AuthorProfile {
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}
