//! Channel sync - binds the selected channel's message stream to the cache
//!
//! One `ChannelSync` owns the `Messages(id)` key of the channel it shows.
//! Selecting a channel closes the previous stream, fetches the history,
//! then opens a stream whose inserts are merged into the cached list.
//! A stream the server ends drops the selection back to `Synced` and marks
//! the cached list stale.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alpaca_cache::{QueryCache, QueryKey};
use alpaca_core::{sort_chronologically, Message, MessageStream, Profile, RecordId, StreamHandle};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::dto::MessageListView;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Lifecycle of one channel selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Fetching {
        channel_id: RecordId,
    },
    Synced {
        channel_id: RecordId,
    },
    /// Terminal for this selection; reselect to retry
    FetchFailed {
        channel_id: RecordId,
        error: String,
    },
    Streaming {
        channel_id: RecordId,
        handle: StreamHandle,
    },
}

impl SyncState {
    /// Channel of the current selection
    pub fn channel_id(&self) -> Option<RecordId> {
        match self {
            Self::Idle => None,
            Self::Fetching { channel_id }
            | Self::Synced { channel_id }
            | Self::FetchFailed { channel_id, .. }
            | Self::Streaming { channel_id, .. } => Some(*channel_id),
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming { .. })
    }
}

struct ActiveStream {
    handle: StreamHandle,
    pump: JoinHandle<()>,
    live: Arc<AtomicBool>,
}

/// Drop a stream from the live count, once per stream
fn release(ctx: &ServiceContext, channel_id: RecordId, live: &AtomicBool) {
    if live.swap(false, Ordering::AcqRel) {
        ctx.stream_closed(channel_id);
    }
}

/// Message list sync unit for the selected channel
pub struct ChannelSync {
    ctx: ServiceContext,
    state: Arc<watch::Sender<SyncState>>,
    active: Option<ActiveStream>,
}

impl ChannelSync {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            state: Arc::new(watch::Sender::new(SyncState::Idle)),
            active: None,
        }
    }

    /// Current state
    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Watch state transitions
    pub fn watch(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Select a channel, or clear the selection with `None`
    ///
    /// A fetch failure leaves the selection in `FetchFailed`. A stream that
    /// fails to open leaves it `Synced` with the fetched history.
    #[instrument(skip(self))]
    pub async fn select(&mut self, channel_id: Option<RecordId>) -> ServiceResult<()> {
        self.teardown().await;
        let Some(channel_id) = channel_id else {
            return Ok(());
        };

        self.set_state(SyncState::Fetching { channel_id });
        let mut messages = match self.ctx.message_repo().list_by_channel(channel_id).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(channel_id = %channel_id, error = %e, "Failed to fetch messages");
                self.set_state(SyncState::FetchFailed {
                    channel_id,
                    error: e.to_string(),
                });
                return Err(e.into());
            }
        };
        sort_chronologically(&mut messages);
        debug!(channel_id = %channel_id, count = messages.len(), "Messages fetched");
        self.ctx
            .cache()
            .write(QueryKey::messages(channel_id), messages);
        self.set_state(SyncState::Synced { channel_id });

        let stream = match self.ctx.feed().open(channel_id).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(channel_id = %channel_id, error = %e, "Failed to open message stream");
                return Err(e.into());
            }
        };
        let handle = stream.handle;
        let live = Arc::new(AtomicBool::new(true));
        self.ctx.stream_opened(channel_id);
        self.set_state(SyncState::Streaming { channel_id, handle });
        let pump = tokio::spawn(pump(
            self.ctx.clone(),
            self.state.clone(),
            live.clone(),
            stream,
        ));
        self.active = Some(ActiveStream { handle, pump, live });

        info!(channel_id = %channel_id, stream = handle.id, "Channel synced");
        Ok(())
    }

    /// Close the stream (if any) and return to `Idle`
    pub async fn teardown(&mut self) {
        if let Some(active) = self.active.take() {
            active.pump.abort();
            release(&self.ctx, active.handle.channel_id, &active.live);
            if let Err(e) = self.ctx.feed().close(&active.handle).await {
                warn!(stream = active.handle.id, error = %e, "Failed to close message stream");
            }
        }
        self.set_state(SyncState::Idle);
    }

    /// Render the selected channel's message list
    pub fn view(&self, current_user: Option<RecordId>) -> MessageListView {
        match &*self.state.borrow() {
            SyncState::Idle => MessageListView::NoChannel,
            SyncState::Fetching { .. } => MessageListView::Loading,
            SyncState::FetchFailed { error, .. } => MessageListView::Error(error.clone()),
            SyncState::Synced { channel_id } | SyncState::Streaming { channel_id, .. } => {
                let messages: Vec<Message> = self
                    .ctx
                    .cache()
                    .read(&QueryKey::messages(*channel_id))
                    .unwrap_or_default();
                MessageListView::from_messages(&messages, current_user)
            }
        }
    }

    fn set_state(&self, state: SyncState) {
        self.state.send_replace(state);
    }
}

impl Drop for ChannelSync {
    fn drop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.pump.abort();
        release(&self.ctx, active.handle.channel_id, &active.live);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let ctx = self.ctx.clone();
                runtime.spawn(async move {
                    if let Err(e) = ctx.feed().close(&active.handle).await {
                        warn!(stream = active.handle.id, error = %e, "Failed to close message stream");
                    }
                });
            }
            Err(_) => warn!(stream = active.handle.id, "Message stream dropped outside a runtime"),
        }
    }
}

impl std::fmt::Debug for ChannelSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSync")
            .field("state", &*self.state.borrow())
            .field("stream", &self.active.as_ref().map(|a| a.handle))
            .finish()
    }
}

async fn pump(
    ctx: ServiceContext,
    state: Arc<watch::Sender<SyncState>>,
    live: Arc<AtomicBool>,
    stream: MessageStream,
) {
    let MessageStream { handle, mut events } = stream;
    while let Some(message) = events.recv().await {
        merge_insert(ctx.cache(), message);
    }

    // Only reached when the feed ends the stream; teardown aborts instead
    let channel_id = handle.channel_id;
    release(&ctx, channel_id, &live);
    ctx.cache().invalidate(&QueryKey::messages(channel_id));
    state.send_if_modified(|current| match current {
        SyncState::Streaming { handle: h, .. } if *h == handle => {
            *current = SyncState::Synced { channel_id };
            true
        }
        _ => false,
    });
    warn!(stream = handle.id, channel_id = %channel_id, "Message stream ended by server");
}

/// Merge a streamed insert into its channel's cached list
///
/// Appends without re-sorting and drops ids already cached. The author's
/// profile, when the message carries one, is appended to the member list if
/// not yet listed. Returns whether the message was appended.
pub fn merge_insert(cache: &QueryCache, message: Message) -> bool {
    let channel_id = message.channel_id;
    let key = QueryKey::messages(channel_id);
    let member = Profile::from_message(&message);

    let appended = if cache.contains(&key) {
        cache
            .update_if(&key, |list: &mut Vec<Message>| {
                if list.iter().any(|m| m.id == message.id) {
                    return false;
                }
                list.push(message);
                true
            })
            .is_some()
    } else {
        cache.write(key, vec![message]);
        true
    };

    if let Some(member) = member {
        cache.update_if(
            &QueryKey::channel_members(channel_id),
            |members: &mut Vec<Profile>| {
                if members.iter().any(|p| p.id == member.id) {
                    return false;
                }
                members.push(member);
                true
            },
        );
    }

    if !appended {
        debug!(channel_id = %channel_id, "Duplicate insert dropped");
    }
    appended
}
