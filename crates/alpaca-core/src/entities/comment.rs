//! Comment entity - threaded under a journal entry or a blog post

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::message::{AuthorProfile, UNKNOWN_USER_LABEL};
use crate::value_objects::timestamp::{lenient_timestamp, null_as_empty};
use crate::value_objects::RecordId;

/// What a comment hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentParent {
    Journal(RecordId),
    BlogPost(RecordId),
}

impl CommentParent {
    /// Foreign-key column on the `comments` table
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Journal(_) => "journal_id",
            Self::BlogPost(_) => "blog_post_id",
        }
    }

    pub const fn id(&self) -> RecordId {
        match self {
            Self::Journal(id) | Self::BlogPost(id) => *id,
        }
    }
}

impl fmt::Display for CommentParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Journal(id) => write!(f, "journal:{id}"),
            Self::BlogPost(id) => write!(f, "blog:{id}"),
        }
    }
}

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: RecordId,
    pub user_id: RecordId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub journal_id: Option<RecordId>,
    #[serde(default)]
    pub blog_post_id: Option<RecordId>,
    #[serde(default)]
    pub parent_comment_id: Option<RecordId>,
    #[serde(default, rename = "profiles", skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorProfile>,
}

impl Comment {
    pub fn author_label(&self) -> &str {
        self.author
            .as_ref()
            .and_then(AuthorProfile::display_name)
            .unwrap_or(UNKNOWN_USER_LABEL)
    }

    /// The parent this comment belongs to, if the row names one
    pub fn parent(&self) -> Option<CommentParent> {
        self.journal_id
            .map(CommentParent::Journal)
            .or(self.blog_post_id.map(CommentParent::BlogPost))
    }
}

/// Insert payload for the `comments` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub user_id: RecordId,
    pub content: String,
    pub journal_id: Option<RecordId>,
    pub blog_post_id: Option<RecordId>,
    pub parent_comment_id: Option<RecordId>,
}

impl NewComment {
    /// Top-level comment under `parent`
    pub fn for_parent(parent: CommentParent, user_id: RecordId, content: impl Into<String>) -> Self {
        let (journal_id, blog_post_id) = match parent {
            CommentParent::Journal(id) => (Some(id), None),
            CommentParent::BlogPost(id) => (None, Some(id)),
        };
        Self {
            user_id,
            content: content.into(),
            journal_id,
            blog_post_id,
            parent_comment_id: None,
        }
    }
}
