//! Note entity - a shared study note (uploaded file or external link)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::timestamp::{lenient_timestamp, null_as_empty};
use crate::value_objects::RecordId;

/// Content type used for uploaded HTML notes
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Note entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Case-insensitive match over title, description and author
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.title, &self.description, &self.author]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Whether the note opens an external link rather than a stored file
    pub fn is_link(&self) -> bool {
        self.external_link.is_some()
    }
}

/// Insert payload for the `notes` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub author: String,
    pub description: String,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub external_link: Option<String>,
}

/// Object name used when storing an uploaded note file
pub fn stored_file_name(prefix: RecordId, original: &str) -> String {
    format!("{prefix}-{original}")
}

/// Whether an upload should be stored as an HTML page
pub fn is_html_upload(file_name: &str, content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.eq_ignore_ascii_case(HTML_CONTENT_TYPE))
        || file_name.to_ascii_lowercase().ends_with(".html")
        || file_name.to_ascii_lowercase().ends_with(".htm")
}
