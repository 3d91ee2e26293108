//! Socket tasks
//!
//! Reader, writer and heartbeat loops. Whichever stops first shuts the socket
//! down, which stops the other two.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;

use super::realtime_socket::SocketInner;
use crate::protocol::Frame;

/// Consecutive unanswered heartbeats before the socket is considered dead
const MAX_MISSED_HEARTBEATS: u32 = 2;

pub(crate) async fn read_loop<S>(
    inner: Arc<SocketInner>,
    mut source: SplitStream<WebSocketStream<S>>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            msg = source.next() => match msg {
                Some(Ok(WsMessage::Text(text))) => inner.handle_text(&text).await,
                Some(Ok(WsMessage::Close(_))) | None => {
                    tracing::info!("Server closed realtime connection");
                    break;
                }
                Some(Ok(_)) => {
                    // Ping/pong are answered by tungstenite; binary frames are unused
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Realtime socket error");
                    break;
                }
            },
            _ = shutdown.changed() => break,
        }
    }
    inner.shutdown("reader stopped");
}

pub(crate) async fn write_loop<S>(
    inner: Arc<SocketInner>,
    mut sink: SplitSink<WebSocketStream<S>, WsMessage>,
    mut outbound: mpsc::Receiver<Frame>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                match frame.to_json() {
                    Ok(json) => {
                        if let Err(e) = sink.send(WsMessage::Text(json)).await {
                            tracing::warn!(error = %e, "Failed to write realtime frame");
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(event = %frame.event, error = %e, "Failed to encode frame"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }
    let _ = sink.close().await;
    inner.shutdown("writer stopped");
}

pub(crate) async fn heartbeat_loop(
    inner: Arc<SocketInner>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    let mut missed = 0u32;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if inner.heartbeat_acked.swap(false, Ordering::SeqCst) {
                    missed = 0;
                } else {
                    missed += 1;
                    if missed >= MAX_MISSED_HEARTBEATS {
                        tracing::warn!(missed, "Realtime heartbeat not acknowledged");
                        break;
                    }
                }

                let reference = inner.next_ref();
                if inner.send(Frame::heartbeat(reference)).await.is_err() {
                    break;
                }
            }
            _ = shutdown.changed() => break,
        }
    }
    inner.shutdown("heartbeat stopped");
}
