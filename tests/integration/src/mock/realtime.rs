//! Realtime websocket (`/realtime/v1/websocket`)
//!
//! Speaks enough of the channel protocol for message streams: join and
//! leave replies, heartbeat replies, and `postgres_changes` pushes for
//! inserts into `messages`.

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use alpaca_core::RecordId;
use alpaca_realtime::{Frame, SocketEvent, Topic};
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use super::MockState;

pub(super) async fn websocket(
    State(state): State<Arc<MockState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| serve(socket, state))
}

async fn serve(mut socket: WebSocket, state: Arc<MockState>) {
    let mut inserts = state.inserts.subscribe();
    let mut joined: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };
                let Ok(frame) = Frame::from_json(&text) else {
                    continue;
                };
                if let Some(reply) = handle_frame(&state, &frame, &mut joined) {
                    if send(&mut socket, &reply).await.is_err() {
                        break;
                    }
                }
            }
            record = inserts.recv() => {
                let record = match record {
                    Ok(record) => record,
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                };
                let Some(topic) = topic_for(&record) else {
                    continue;
                };
                if joined.contains(&topic) && send(&mut socket, &change_frame(&topic, record)).await.is_err() {
                    break;
                }
            }
        }
    }

    let mut topics = state.topics.lock();
    for topic in joined {
        if let Some(count) = topics.get_mut(&topic) {
            *count = count.saturating_sub(1);
        }
    }
}

async fn send(socket: &mut WebSocket, frame: &Frame) -> Result<(), axum::Error> {
    let text = frame.to_json().map_err(axum::Error::new)?;
    socket.send(WsMessage::Text(text)).await
}

fn reply(frame: &Frame, status: &str, response: Value) -> Frame {
    let reply = Frame::new(
        frame.topic.clone(),
        SocketEvent::Reply,
        json!({"status": status, "response": response}),
    );
    match &frame.reference {
        Some(reference) => reply.with_ref(reference),
        None => reply,
    }
}

fn handle_frame(state: &MockState, frame: &Frame, joined: &mut HashSet<String>) -> Option<Frame> {
    match frame.kind()? {
        SocketEvent::Heartbeat => Some(reply(frame, "ok", json!({}))),
        SocketEvent::Join => {
            if state.reject_joins.load(Ordering::SeqCst) {
                debug!(topic = %frame.topic, "Join rejected");
                return Some(reply(frame, "error", json!({"reason": "unauthorized"})));
            }
            if joined.insert(frame.topic.clone()) {
                *state.topics.lock().entry(frame.topic.clone()).or_insert(0) += 1;
                debug!(topic = %frame.topic, "Topic joined");
            }
            let changes = frame
                .payload
                .pointer("/config/postgres_changes")
                .cloned()
                .unwrap_or_else(|| json!([]));
            Some(reply(frame, "ok", json!({"postgres_changes": changes})))
        }
        SocketEvent::Leave => {
            if joined.remove(&frame.topic) {
                if let Some(count) = state.topics.lock().get_mut(&frame.topic) {
                    *count = count.saturating_sub(1);
                }
            }
            Some(reply(frame, "ok", json!({})))
        }
        _ => None,
    }
}

/// Topic a message insert is delivered on
fn topic_for(record: &Value) -> Option<String> {
    let channel_id = RecordId::parse(record.get("channel_id")?.as_str()?).ok()?;
    Some(Topic::Messages(channel_id).name())
}

fn change_frame(topic: &str, record: Value) -> Frame {
    Frame::new(
        topic,
        SocketEvent::PostgresChanges,
        json!({
            "data": {
                "type": "INSERT",
                "schema": "public",
                "table": "messages",
                "commit_timestamp": Utc::now().to_rfc3339(),
                "record": record,
                "old_record": null
            },
            "ids": [1]
        }),
    )
}
