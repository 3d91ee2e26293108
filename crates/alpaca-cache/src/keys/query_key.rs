//! Query key definitions.
//!
//! Defines the naming conventions for cached query results.

use alpaca_core::{CommentParent, RecordId};

/// Resource name for the channel list
pub const CHANNELS: &str = "channels";
/// Resource name for a single channel
pub const CHANNEL: &str = "channel";
/// Resource name for a channel's message list
pub const MESSAGES: &str = "messages";
/// Resource name for a channel's derived member list
pub const CHANNEL_MEMBERS: &str = "channel_members";
/// Resource name for (filtered) blog post lists
pub const BLOG_POSTS: &str = "blog_posts";
/// Resource name for a single blog post
pub const BLOG_POST: &str = "blog_post";
/// Resource name for the tag list
pub const TAGS: &str = "tags";
/// Resource name for the journal list
pub const JOURNALS: &str = "journals";
/// Resource name for a single journal entry
pub const JOURNAL: &str = "journal";
/// Resource name for comment threads
pub const COMMENTS: &str = "comments";
/// Resource name for the notes list
pub const NOTES: &str = "notes";

/// Identifies one cached query result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Channels,
    Channel(RecordId),
    Messages(RecordId),
    ChannelMembers(RecordId),
    /// Post list filtered by tag names (empty = unfiltered)
    BlogPosts(Vec<String>),
    BlogPost(RecordId),
    Tags,
    Journals,
    Journal(RecordId),
    Comments(CommentParent),
    Notes,
}

impl QueryKey {
    /// Create a message list key
    #[must_use]
    pub fn messages(channel_id: RecordId) -> Self {
        Self::Messages(channel_id)
    }

    /// Create a member list key
    #[must_use]
    pub fn channel_members(channel_id: RecordId) -> Self {
        Self::ChannelMembers(channel_id)
    }

    /// Create a blog list key; tag order does not matter
    #[must_use]
    pub fn blog_posts<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut tags: Vec<String> = tags.iter().map(|t| t.as_ref().to_string()).collect();
        tags.sort();
        tags.dedup();
        Self::BlogPosts(tags)
    }

    /// Resource this key belongs to
    #[must_use]
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Channels => CHANNELS,
            Self::Channel(_) => CHANNEL,
            Self::Messages(_) => MESSAGES,
            Self::ChannelMembers(_) => CHANNEL_MEMBERS,
            Self::BlogPosts(_) => BLOG_POSTS,
            Self::BlogPost(_) => BLOG_POST,
            Self::Tags => TAGS,
            Self::Journals => JOURNALS,
            Self::Journal(_) => JOURNAL,
            Self::Comments(_) => COMMENTS,
            Self::Notes => NOTES,
        }
    }

    /// Get the key name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Channels | Self::Tags | Self::Journals | Self::Notes => {
                self.resource().to_string()
            }
            Self::Channel(id)
            | Self::Messages(id)
            | Self::ChannelMembers(id)
            | Self::BlogPost(id)
            | Self::Journal(id) => format!("{}:{id}", self.resource()),
            Self::BlogPosts(tags) if tags.is_empty() => BLOG_POSTS.to_string(),
            Self::BlogPosts(tags) => format!("{BLOG_POSTS}:{}", tags.join(",")),
            Self::Comments(parent) => format!("{COMMENTS}:{parent}"),
        }
    }

    /// Parse a key name back to a `QueryKey`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let (resource, rest) = match name.split_once(':') {
            Some((resource, rest)) => (resource, Some(rest)),
            None => (name, None),
        };
        let id = || rest.and_then(|raw| RecordId::parse(raw).ok());

        match (resource, rest) {
            (CHANNELS, None) => Some(Self::Channels),
            (TAGS, None) => Some(Self::Tags),
            (JOURNALS, None) => Some(Self::Journals),
            (NOTES, None) => Some(Self::Notes),
            (BLOG_POSTS, None) => Some(Self::BlogPosts(Vec::new())),
            (BLOG_POSTS, Some(tags)) => {
                let tags: Vec<&str> = tags.split(',').filter(|t| !t.is_empty()).collect();
                Some(Self::blog_posts(&tags))
            }
            (CHANNEL, Some(_)) => id().map(Self::Channel),
            (MESSAGES, Some(_)) => id().map(Self::Messages),
            (CHANNEL_MEMBERS, Some(_)) => id().map(Self::ChannelMembers),
            (BLOG_POST, Some(_)) => id().map(Self::BlogPost),
            (JOURNAL, Some(_)) => id().map(Self::Journal),
            (COMMENTS, Some(parent)) => {
                let (kind, raw) = parent.split_once(':')?;
                let parent_id = RecordId::parse(raw).ok()?;
                match kind {
                    "journal" => Some(Self::Comments(CommentParent::Journal(parent_id))),
                    "blog" => Some(Self::Comments(CommentParent::BlogPost(parent_id))),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
