//! Message feed over the realtime socket
//!
//! Connects lazily on the first `open` and reconnects on demand once the
//! previous socket has closed. No automatic reconnect.
//!
//! Stream ids are allocated by the feed and never reused, so a handle from a
//! closed socket cannot reach a subscription on its replacement.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::instrument;

use alpaca_common::{ClientConfig, SessionToken};
use alpaca_core::traits::{MessageFeed, MessageStream, RepoResult, StreamHandle};
use alpaca_core::RecordId;

use crate::socket::RealtimeSocket;
use crate::topic::Topic;

/// Socket subscription behind one open stream
#[derive(Debug)]
struct OpenStream {
    socket: RealtimeSocket,
    subscription: u64,
}

/// `MessageFeed` implementation backed by [`RealtimeSocket`]
#[derive(Debug)]
pub struct RealtimeMessageFeed {
    config: ClientConfig,
    session: SessionToken,
    socket: Mutex<Option<RealtimeSocket>>,
    streams: DashMap<u64, OpenStream>,
    next_stream: AtomicU64,
}

impl RealtimeMessageFeed {
    /// Create a feed that connects on first use
    pub fn new(config: ClientConfig, session: SessionToken) -> Self {
        Self {
            config,
            session,
            socket: Mutex::new(None),
            streams: DashMap::new(),
            next_stream: AtomicU64::new(0),
        }
    }

    /// Create a feed over an already connected socket
    pub fn with_socket(config: ClientConfig, session: SessionToken, socket: RealtimeSocket) -> Self {
        Self {
            config,
            session,
            socket: Mutex::new(Some(socket)),
            streams: DashMap::new(),
            next_stream: AtomicU64::new(0),
        }
    }

    /// The live socket, connecting if there is none
    async fn socket(&self) -> RepoResult<RealtimeSocket> {
        let mut slot = self.socket.lock().await;
        if let Some(socket) = slot.as_ref().filter(|s| !s.is_closed()) {
            return Ok(socket.clone());
        }
        let socket = RealtimeSocket::connect(&self.config, self.session.clone()).await?;
        *slot = Some(socket.clone());
        Ok(socket)
    }

    /// Close the underlying socket, ending every open stream
    pub async fn shutdown(&self) {
        if let Some(socket) = self.socket.lock().await.take() {
            socket.close();
        }
        self.streams.clear();
    }
}

#[async_trait]
impl MessageFeed for RealtimeMessageFeed {
    #[instrument(skip(self))]
    async fn open(&self, channel_id: RecordId) -> RepoResult<MessageStream> {
        let socket = self.socket().await?;
        let subscription = socket.subscribe(Topic::Messages(channel_id)).await?;
        let id = self.next_stream.fetch_add(1, Ordering::SeqCst) + 1;
        self.streams.insert(
            id,
            OpenStream {
                socket,
                subscription: subscription.id,
            },
        );

        tracing::debug!(stream_id = id, subscription_id = subscription.id, "Message stream opened");
        Ok(MessageStream {
            handle: StreamHandle { id, channel_id },
            events: subscription.events,
        })
    }

    #[instrument(skip(self), fields(stream_id = handle.id, channel_id = %handle.channel_id))]
    async fn close(&self, handle: &StreamHandle) -> RepoResult<()> {
        let Some((_, stream)) = self.streams.remove(&handle.id) else {
            return Ok(());
        };
        if stream
            .socket
            .unsubscribe(Topic::Messages(handle.channel_id), stream.subscription)
            .await
        {
            tracing::debug!("Message stream closed");
        }
        Ok(())
    }
}
