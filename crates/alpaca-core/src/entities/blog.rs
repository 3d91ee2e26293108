//! Blog entities - posts and their tags

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::RecordId;

/// Maximum blog title length
pub const MAX_TITLE_LENGTH: usize = 255;

/// A tag that can be attached to blog posts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: RecordId,
    pub name: String,
}

/// Blog post entity with its tags resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: RecordId,
    pub user_id: RecordId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
}

impl BlogPost {
    /// Tag names in link order
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    /// Tags rendered back into the comma-separated editor field
    pub fn tag_text(&self) -> String {
        self.tag_names().join(", ")
    }

    /// Check whether the post carries a tag (case-sensitive, as stored)
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Check whether `user_id` wrote this post
    #[inline]
    pub fn is_owned_by(&self, user_id: RecordId) -> bool {
        self.user_id == user_id
    }

    /// Whether the post was edited after creation
    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some_and(|u| u > self.created_at)
    }
}

/// Insert payload for the `blog_posts` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBlogPost {
    pub user_id: RecordId,
    pub title: String,
    pub content: String,
}

/// Partial update for the `blog_posts` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlogPostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl BlogPostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Split the comma-separated tag field into trimmed, non-empty, unique names
pub fn parse_tag_list(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in text.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names
}
