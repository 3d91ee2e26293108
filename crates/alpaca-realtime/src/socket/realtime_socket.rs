//! Realtime socket connection
//!
//! One websocket per client. Streams join topics through a reference-counted
//! registry: the first subscriber to a topic sends `phx_join`, the last one
//! to leave sends `phx_leave`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio_tungstenite::WebSocketStream;

use alpaca_common::{ClientConfig, RealtimeConfig, SessionToken};
use alpaca_core::entities::Message;
use alpaca_core::error::DomainError;

use super::tasks::{heartbeat_loop, read_loop, write_loop};
use crate::protocol::{ChangesPayload, Frame, JoinPayload, ReplyPayload, SocketEvent};
use crate::topic::Topic;

/// Outbound frame queue size
const OUTBOUND_BUFFER_SIZE: usize = 64;

/// An open subscription to a topic
#[derive(Debug)]
pub struct Subscription {
    pub id: u64,
    pub topic: Topic,
    pub events: mpsc::Receiver<Message>,
}

/// Local subscribers of one joined topic
#[derive(Debug)]
struct TopicEntry {
    subscribers: HashMap<u64, mpsc::Sender<Message>>,
    /// Ref of the `phx_join` that opened this membership
    join_ref: String,
}

pub(crate) struct SocketInner {
    outbound: mpsc::Sender<Frame>,
    topics: DashMap<String, TopicEntry>,
    /// Reply waiters keyed by frame ref
    pending: DashMap<String, oneshot::Sender<ReplyPayload>>,
    /// Serializes join/leave so a topic is joined at most once
    membership: Mutex<()>,
    next_ref: AtomicU64,
    next_subscription: AtomicU64,
    pub(crate) heartbeat_acked: AtomicBool,
    closed: AtomicBool,
    shutdown: watch::Sender<bool>,
    session: SessionToken,
    join_timeout: Duration,
    buffer: usize,
}

/// Handle to the realtime socket (cheap to clone)
#[derive(Clone)]
pub struct RealtimeSocket {
    inner: Arc<SocketInner>,
}

impl RealtimeSocket {
    /// Connect to the backend's realtime endpoint
    ///
    /// Spawns the reader, writer and heartbeat tasks.
    pub async fn connect(config: &ClientConfig, session: SessionToken) -> Result<Self, DomainError> {
        let url = config.backend.realtime_url();
        let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| DomainError::Realtime(format!("connect failed: {e}")))?;

        tracing::info!(app = %config.app.name, "Realtime socket connected");
        Ok(Self::start(stream, &config.realtime, session))
    }

    /// Run the socket over an established websocket stream
    pub fn start<S>(stream: WebSocketStream<S>, config: &RealtimeConfig, session: SessionToken) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
        let (shutdown_tx, _) = watch::channel(false);

        let inner = Arc::new(SocketInner {
            outbound: outbound_tx,
            topics: DashMap::new(),
            pending: DashMap::new(),
            membership: Mutex::new(()),
            next_ref: AtomicU64::new(0),
            next_subscription: AtomicU64::new(0),
            heartbeat_acked: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            shutdown: shutdown_tx,
            session,
            join_timeout: Duration::from_millis(config.join_timeout_ms),
            buffer: config.buffer.max(1),
        });

        let (sink, source) = stream.split();
        let heartbeat = Duration::from_millis(config.heartbeat_ms.max(1));

        tokio::spawn(read_loop(inner.clone(), source, inner.shutdown.subscribe()));
        tokio::spawn(write_loop(inner.clone(), sink, outbound_rx, inner.shutdown.subscribe()));
        tokio::spawn(heartbeat_loop(inner.clone(), heartbeat, inner.shutdown.subscribe()));

        Self { inner }
    }

    /// Subscribe to a topic, joining it on the server if this is the first subscriber
    ///
    /// # Errors
    /// Returns `DomainError::Realtime` if the socket is closed, or the join is
    /// rejected or not answered within the join timeout
    pub async fn subscribe(&self, topic: Topic) -> Result<Subscription, DomainError> {
        let inner = &self.inner;
        inner.ensure_open()?;

        let _guard = inner.membership.lock().await;
        let name = topic.name();
        let id = inner.next_subscription.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, events) = mpsc::channel(inner.buffer);

        if let Some(mut entry) = inner.topics.get_mut(&name) {
            entry.subscribers.insert(id, tx);
            tracing::debug!(
                topic = %name,
                subscription_id = id,
                subscribers = entry.subscribers.len(),
                "Attached to joined topic"
            );
            return Ok(Subscription { id, topic, events });
        }

        // Register before joining so no event after the reply is missed
        let reference = inner.next_ref();
        inner.topics.insert(
            name.clone(),
            TopicEntry {
                subscribers: HashMap::from([(id, tx)]),
                join_ref: reference.to_string(),
            },
        );

        if let Err(e) = inner.join(topic, &name, reference).await {
            inner.topics.remove(&name);
            tracing::warn!(topic = %name, error = %e, "Topic join failed");
            return Err(e);
        }

        tracing::info!(topic = %name, subscription_id = id, "Topic joined");
        Ok(Subscription { id, topic, events })
    }

    /// Drop a subscription, leaving the topic when it was the last one
    ///
    /// Returns `false` if the subscription was already gone.
    pub async fn unsubscribe(&self, topic: Topic, id: u64) -> bool {
        let inner = &self.inner;
        let _guard = inner.membership.lock().await;
        let name = topic.name();

        let now_empty = match inner.topics.get_mut(&name) {
            Some(mut entry) => {
                if entry.subscribers.remove(&id).is_none() {
                    return false;
                }
                entry.subscribers.is_empty()
            }
            None => return false,
        };

        if now_empty {
            inner.topics.remove(&name);
            let reference = inner.next_ref();
            if inner.send(Frame::leave(&name, reference)).await.is_err() {
                tracing::debug!(topic = %name, "Socket closed before leave was sent");
            } else {
                tracing::info!(topic = %name, "Topic left");
            }
        }
        true
    }

    /// Close the socket; closing twice is a no-op
    pub fn close(&self) {
        self.inner.shutdown("closed by client");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Number of topics currently joined
    pub fn joined_topics(&self) -> usize {
        self.inner.topics.len()
    }

    /// Number of local subscribers on a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .topics
            .get(&topic.name())
            .map_or(0, |entry| entry.subscribers.len())
    }
}

impl std::fmt::Debug for RealtimeSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeSocket")
            .field("joined_topics", &self.joined_topics())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl SocketInner {
    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DomainError::Realtime("socket closed".to_string()));
        }
        Ok(())
    }

    pub(crate) fn next_ref(&self) -> u64 {
        self.next_ref.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) async fn send(&self, frame: Frame) -> Result<(), DomainError> {
        self.outbound
            .send(frame)
            .await
            .map_err(|_| DomainError::Realtime("socket closed".to_string()))
    }

    /// Send `phx_join` and wait for an `ok` reply
    async fn join(&self, topic: Topic, name: &str, reference: u64) -> Result<(), DomainError> {
        let payload = match topic {
            Topic::Messages(channel_id) => {
                JoinPayload::message_inserts(channel_id, self.session.access_token())
            }
        };

        let key = reference.to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(key.clone(), tx);

        if let Err(e) = self.send(Frame::join(name, &payload, reference)).await {
            self.pending.remove(&key);
            return Err(e);
        }

        let reply = match tokio::time::timeout(self.join_timeout, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => {
                return Err(DomainError::Realtime(
                    "socket closed before join reply".to_string(),
                ))
            }
            Err(_) => {
                self.pending.remove(&key);
                return Err(DomainError::Realtime(format!(
                    "no join reply within {}ms",
                    self.join_timeout.as_millis()
                )));
            }
        };

        if reply.is_ok() {
            Ok(())
        } else {
            Err(DomainError::Realtime(format!(
                "join rejected: {}",
                reply.reason()
            )))
        }
    }

    /// Route one inbound text frame
    pub(crate) async fn handle_text(&self, text: &str) {
        let frame = match Frame::from_json(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "Undecodable realtime frame");
                return;
            }
        };

        match frame.kind() {
            Some(SocketEvent::Reply) => self.handle_reply(&frame),
            Some(SocketEvent::PostgresChanges) => self.dispatch_change(&frame).await,
            Some(SocketEvent::Error | SocketEvent::Close) => self.drop_topic(&frame),
            Some(SocketEvent::System) => {
                tracing::debug!(topic = %frame.topic, payload = %frame.payload, "System notice");
            }
            _ => {
                tracing::trace!(topic = %frame.topic, event = %frame.event, "Ignored frame");
            }
        }
    }

    fn handle_reply(&self, frame: &Frame) {
        if frame.is_phoenix() {
            self.heartbeat_acked.store(true, Ordering::SeqCst);
            return;
        }

        let Some((_, waiter)) = frame
            .reference
            .as_ref()
            .and_then(|reference| self.pending.remove(reference))
        else {
            return;
        };

        let reply = frame.payload_as::<ReplyPayload>().unwrap_or_else(|e| ReplyPayload {
            status: "error".to_string(),
            response: serde_json::json!({ "reason": format!("malformed reply: {e}") }),
        });
        // The waiter may have timed out already
        let _ = waiter.send(reply);
    }

    async fn dispatch_change(&self, frame: &Frame) {
        let change = match frame.payload_as::<ChangesPayload>() {
            Ok(payload) => payload.data,
            Err(e) => {
                tracing::warn!(topic = %frame.topic, error = %e, "Undecodable change payload");
                return;
            }
        };

        if !change.is_insert_on("messages") {
            tracing::trace!(topic = %frame.topic, table = %change.table, "Ignored change");
            return;
        }

        let message: Message = match change.decode_record() {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(topic = %frame.topic, error = %e, "Skipping undecodable message record");
                return;
            }
        };

        let subscribers: Vec<mpsc::Sender<Message>> = match self.topics.get(&frame.topic) {
            Some(entry) => entry.subscribers.values().cloned().collect(),
            None => {
                tracing::debug!(topic = %frame.topic, "Change for a topic with no subscribers");
                return;
            }
        };

        tracing::debug!(
            topic = %frame.topic,
            message_id = %message.id,
            subscribers = subscribers.len(),
            "Message insert received"
        );
        for tx in subscribers {
            if tx.send(message.clone()).await.is_err() {
                tracing::debug!(topic = %frame.topic, "Subscriber dropped its stream");
            }
        }
    }

    /// Forget a topic the server closed, ending its subscribers' streams
    ///
    /// A close that carries the ref of an earlier join is ignored.
    fn drop_topic(&self, frame: &Frame) {
        let removed = self.topics.remove_if(&frame.topic, |_, entry| match &frame.reference {
            Some(reference) => *reference == entry.join_ref,
            None => true,
        });
        match removed {
            Some((_, entry)) => tracing::warn!(
                topic = %frame.topic,
                event = %frame.event,
                subscribers = entry.subscribers.len(),
                "Topic closed by server"
            ),
            None => tracing::debug!(topic = %frame.topic, event = %frame.event, "Stale topic close"),
        }
    }

    /// Stop every task and end all streams; only the first call has effect
    pub(crate) fn shutdown(&self, reason: &str) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!(reason, "Realtime socket closed");
        self.shutdown.send_replace(true);
        // Dropping the senders ends every open stream
        self.topics.clear();
        self.pending.clear();
    }
}
