//! Non-table ports: file storage, authentication and the message feed

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::repositories::RepoResult;
use crate::entities::{Message, Session};
use crate::value_objects::RecordId;

// ============================================================================
// File Storage
// ============================================================================

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Upload an object and return its path inside the bucket
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> RepoResult<String>;

    /// Download an object
    async fn download(&self, bucket: &str, path: &str) -> RepoResult<Vec<u8>>;

    /// Public URL of an object in a public bucket
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

// ============================================================================
// Authentication
// ============================================================================

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> RepoResult<Session>;

    /// Register a user; `None` when the backend requires email confirmation first
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> RepoResult<Option<Session>>;

    /// Exchange the refresh token for a new session
    async fn refresh(&self) -> RepoResult<Session>;

    /// End the current session
    async fn sign_out(&self) -> RepoResult<()>;

    /// The current session, if signed in
    fn current_session(&self) -> Option<Session>;
}

// ============================================================================
// Message Feed
// ============================================================================

/// Identifies one open message stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle {
    pub id: u64,
    pub channel_id: RecordId,
}

/// An open stream of messages inserted into one channel
///
/// Only messages inserted after the stream opened are delivered. The receiver
/// ends once the stream is closed or the connection drops.
#[derive(Debug)]
pub struct MessageStream {
    pub handle: StreamHandle,
    pub events: mpsc::Receiver<Message>,
}

#[async_trait]
pub trait MessageFeed: Send + Sync {
    /// Open a stream of inserts for a channel
    async fn open(&self, channel_id: RecordId) -> RepoResult<MessageStream>;

    /// Close a stream; closing twice is a no-op
    async fn close(&self, handle: &StreamHandle) -> RepoResult<()>;
}
