//! # alpaca-cache
//!
//! In-process cache of backend query results, shared by every view and sync
//! unit of the client.
//!
//! ## Features
//!
//! - **Query keys**: typed names for every cached query (`messages:<channel>` etc.)
//! - **Store**: type-erased values with per-key versions and staleness flags
//! - **Patching**: atomic per-key updates for realtime merges and mutations
//! - **Listeners**: per-key change notifications
//!
//! ## Example
//!
//! ```ignore
//! use alpaca_cache::{QueryCache, QueryKey};
//!
//! let cache = QueryCache::shared();
//! let key = QueryKey::messages(channel_id);
//! let mut listener = cache.subscribe(key.clone());
//!
//! cache.write(key.clone(), fetched_messages);
//! cache.update(&key, |list: &mut Vec<Message>| list.push(incoming));
//! ```

pub mod keys;
pub mod store;

// Re-export key types
pub use keys::{
    QueryKey, BLOG_POST, BLOG_POSTS, CHANNEL, CHANNELS, CHANNEL_MEMBERS, COMMENTS, JOURNAL,
    JOURNALS, MESSAGES, NOTES, TAGS,
};

// Re-export store types
pub use store::{
    CacheConfig, CacheEvent, CacheEventKind, CacheListener, QueryCache, SharedQueryCache,
};
