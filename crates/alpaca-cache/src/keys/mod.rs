//! Query keys

mod query_key;

pub use query_key::{
    QueryKey, BLOG_POST, BLOG_POSTS, CHANNEL, CHANNELS, CHANNEL_MEMBERS, COMMENTS, JOURNAL,
    JOURNALS, MESSAGES, NOTES, TAGS,
};
