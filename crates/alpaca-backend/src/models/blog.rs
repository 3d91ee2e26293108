//! Blog post rows

use alpaca_core::value_objects::timestamp::{lenient_timestamp, lenient_timestamp_opt, null_as_empty};
use alpaca_core::{RecordId, Tag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Select list for posts with their tags embedded through the link table
pub const BLOG_POST_SELECT: &str = "*,blog_post_tags(tags(*))";

/// A `blog_posts` row with embedded tag links
#[derive(Debug, Clone, Deserialize)]
pub struct BlogPostRow {
    pub id: RecordId,
    pub user_id: RecordId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "lenient_timestamp_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub blog_post_tags: Vec<PostTagRow>,
}

/// One embedded link; the tag is null when the row is hidden by policy
#[derive(Debug, Clone, Deserialize)]
pub struct PostTagRow {
    #[serde(default)]
    pub tags: Option<Tag>,
}

/// `blog_post_tags.blog_post_id` projection
#[derive(Debug, Clone, Deserialize)]
pub struct PostIdRow {
    pub blog_post_id: RecordId,
}

/// Insert payload for `blog_post_tags`
#[derive(Debug, Clone, Serialize)]
pub struct TagLinkInsert {
    pub blog_post_id: RecordId,
    pub tag_id: RecordId,
}

/// Insert payload for `tags`
#[derive(Debug, Clone, Serialize)]
pub struct TagInsert<'a> {
    pub name: &'a str,
}
