//! Cache change notifications.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::keys::QueryKey;

/// What happened to a cached entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEventKind {
    /// A value was written or patched
    Written,
    /// The entry was marked stale
    Invalidated,
    /// The entry was dropped
    Removed,
}

/// Notification delivered to listeners of a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: QueryKey,
    pub kind: CacheEventKind,
    /// Entry version after the change
    pub version: u64,
}

/// Receives the events of one key
///
/// Dropping the listener unsubscribes it.
#[derive(Debug)]
pub struct CacheListener {
    key: QueryKey,
    rx: broadcast::Receiver<CacheEvent>,
}

impl CacheListener {
    pub(crate) fn new(key: QueryKey, rx: broadcast::Receiver<CacheEvent>) -> Self {
        Self { key, rx }
    }

    /// Key this listener watches
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Wait for the next event; `None` once the cache is dropped
    ///
    /// A slow listener skips the events it missed and keeps going.
    pub async fn recv(&mut self) -> Option<CacheEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(key = %self.key, skipped, "Cache listener lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event without waiting
    pub fn try_recv(&mut self) -> Option<CacheEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(key = %self.key, skipped, "Cache listener lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
