//! Service context - dependency container for services
//!
//! Holds the repositories, the message feed, storage, the auth gateway and the
//! shared query cache.

use std::sync::Arc;

use dashmap::DashMap;

use alpaca_backend::{
    build_http_client, AuthClient, RestBlogRepository, RestChannelRepository,
    RestClient, RestCommentRepository, RestJournalRepository, RestMessageRepository,
    RestNoteRepository, StorageClient,
};
use alpaca_cache::{QueryCache, QueryKey, SharedQueryCache};
use alpaca_common::{ClientConfig, SessionToken};
use alpaca_core::traits::{
    AuthGateway, BlogRepository, ChannelRepository, CommentRepository, FileStorage,
    JournalRepository, MessageFeed, MessageRepository, NoteRepository,
};
use alpaca_core::{DomainError, RecordId, Session};
use alpaca_realtime::RealtimeMessageFeed;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone; every clone shares the same cache and live-stream registry.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    channel_repo: Arc<dyn ChannelRepository>,
    message_repo: Arc<dyn MessageRepository>,
    blog_repo: Arc<dyn BlogRepository>,
    journal_repo: Arc<dyn JournalRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    note_repo: Arc<dyn NoteRepository>,

    // Realtime, files and auth
    feed: Arc<dyn MessageFeed>,
    storage: Arc<dyn FileStorage>,
    auth: Arc<dyn AuthGateway>,

    // Shared state
    cache: SharedQueryCache,
    live_streams: Arc<DashMap<RecordId, usize>>,
    notes_bucket: String,
}

impl ServiceContext {
    /// Wire the real backend clients for a configuration
    ///
    /// The realtime socket is connected on the first stream open.
    pub fn connect(config: &ClientConfig) -> ServiceResult<Self> {
        let http = build_http_client(config)?;
        let session = SessionToken::new();
        let rest = RestClient::new(http.clone(), &config.backend, session.clone());

        let context = ServiceContextBuilder::new()
            .channel_repo(Arc::new(RestChannelRepository::new(rest.clone())))
            .message_repo(Arc::new(RestMessageRepository::new(rest.clone())))
            .blog_repo(Arc::new(RestBlogRepository::new(rest.clone())))
            .journal_repo(Arc::new(RestJournalRepository::new(rest.clone())))
            .comment_repo(Arc::new(RestCommentRepository::new(rest.clone())))
            .note_repo(Arc::new(RestNoteRepository::new(rest)))
            .feed(Arc::new(RealtimeMessageFeed::new(config.clone(), session.clone())))
            .storage(Arc::new(StorageClient::new(
                http.clone(),
                &config.backend,
                session.clone(),
            )))
            .auth(Arc::new(AuthClient::new(http, &config.backend, session)))
            .notes_bucket(config.storage.notes_bucket.clone())
            .build()?;

        tracing::info!(
            app = %config.app.name,
            env = ?config.app.env,
            backend = %config.backend.url,
            "Service context ready"
        );
        Ok(context)
    }

    // === Repositories ===

    pub fn channel_repo(&self) -> &dyn ChannelRepository {
        self.channel_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn blog_repo(&self) -> &dyn BlogRepository {
        self.blog_repo.as_ref()
    }

    pub fn journal_repo(&self) -> &dyn JournalRepository {
        self.journal_repo.as_ref()
    }

    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    pub fn note_repo(&self) -> &dyn NoteRepository {
        self.note_repo.as_ref()
    }

    // === Realtime, Files, Auth ===

    pub fn feed(&self) -> &dyn MessageFeed {
        self.feed.as_ref()
    }

    pub fn storage(&self) -> &dyn FileStorage {
        self.storage.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthGateway {
        self.auth.as_ref()
    }

    /// Bucket holding note files
    pub fn notes_bucket(&self) -> &str {
        &self.notes_bucket
    }

    // === Cache ===

    pub fn cache(&self) -> &QueryCache {
        self.cache.as_ref()
    }

    /// Cached value under `key`, unless absent or stale
    pub(crate) fn fresh<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.cache.is_stale(key) {
            return None;
        }
        self.cache.read(key)
    }

    /// Shared handle to the cache
    pub fn shared_cache(&self) -> SharedQueryCache {
        self.cache.clone()
    }

    // === Session ===

    /// The signed-in session, if any
    pub fn session(&self) -> Option<Session> {
        self.auth.current_session()
    }

    /// ID of the signed-in user
    pub fn current_user(&self) -> Option<RecordId> {
        self.session().map(|s| s.user_id)
    }

    /// ID of the signed-in user, or `NotAuthenticated`
    pub fn require_user(&self) -> ServiceResult<RecordId> {
        self.current_user()
            .ok_or(ServiceError::Domain(DomainError::NotAuthenticated))
    }

    // === Live Streams ===

    /// Record an open stream for a channel
    pub(crate) fn stream_opened(&self, channel_id: RecordId) {
        *self.live_streams.entry(channel_id).or_insert(0) += 1;
    }

    /// Record a closed stream for a channel
    pub(crate) fn stream_closed(&self, channel_id: RecordId) {
        self.live_streams
            .remove_if_mut(&channel_id, |_, count| {
                *count = count.saturating_sub(1);
                *count == 0
            });
    }

    /// Check whether inserts into a channel currently arrive over a stream
    pub fn has_live_stream(&self, channel_id: RecordId) -> bool {
        self.live_streams
            .get(&channel_id)
            .is_some_and(|count| *count > 0)
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("cache", &self.cache)
            .field("live_streams", &self.live_streams.len())
            .field("notes_bucket", &self.notes_bucket)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom dependencies
#[derive(Default)]
pub struct ServiceContextBuilder {
    channel_repo: Option<Arc<dyn ChannelRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    blog_repo: Option<Arc<dyn BlogRepository>>,
    journal_repo: Option<Arc<dyn JournalRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    note_repo: Option<Arc<dyn NoteRepository>>,
    feed: Option<Arc<dyn MessageFeed>>,
    storage: Option<Arc<dyn FileStorage>>,
    auth: Option<Arc<dyn AuthGateway>>,
    cache: Option<SharedQueryCache>,
    notes_bucket: Option<String>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_repo(mut self, repo: Arc<dyn ChannelRepository>) -> Self {
        self.channel_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn blog_repo(mut self, repo: Arc<dyn BlogRepository>) -> Self {
        self.blog_repo = Some(repo);
        self
    }

    pub fn journal_repo(mut self, repo: Arc<dyn JournalRepository>) -> Self {
        self.journal_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn note_repo(mut self, repo: Arc<dyn NoteRepository>) -> Self {
        self.note_repo = Some(repo);
        self
    }

    pub fn feed(mut self, feed: Arc<dyn MessageFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn FileStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthGateway>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Share an existing cache (defaults to a fresh one)
    pub fn cache(mut self, cache: SharedQueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Notes bucket name (defaults to `notes`)
    pub fn notes_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.notes_bucket = Some(bucket.into());
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        Ok(ServiceContext {
            channel_repo: required(self.channel_repo, "channel_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            blog_repo: required(self.blog_repo, "blog_repo")?,
            journal_repo: required(self.journal_repo, "journal_repo")?,
            comment_repo: required(self.comment_repo, "comment_repo")?,
            note_repo: required(self.note_repo, "note_repo")?,
            feed: required(self.feed, "feed")?,
            storage: required(self.storage, "storage")?,
            auth: required(self.auth, "auth")?,
            cache: self.cache.unwrap_or_else(QueryCache::shared),
            live_streams: Arc::new(DashMap::new()),
            notes_bucket: self.notes_bucket.unwrap_or_else(|| "notes".to_string()),
        })
    }
}
