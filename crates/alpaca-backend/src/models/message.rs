//! Message author rows

use alpaca_core::RecordId;
use serde::Deserialize;

/// Select list for message rows with the author join
pub const MESSAGE_SELECT: &str = "*,profiles(username,avatar_url)";

/// Select list for deriving channel members
pub const AUTHOR_SELECT: &str = "user_id,profiles(id,username,avatar_url)";

/// One message's author, as returned by [`AUTHOR_SELECT`]
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorRow {
    pub user_id: RecordId,
    #[serde(default)]
    pub profiles: Option<ProfileRow>,
}

/// Joined profile columns
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
