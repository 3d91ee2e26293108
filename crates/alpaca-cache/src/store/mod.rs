//! Query result store

mod events;
mod query_cache;

pub use events::{CacheEvent, CacheEventKind, CacheListener};
pub use query_cache::{CacheConfig, QueryCache, SharedQueryCache};
