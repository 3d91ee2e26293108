//! In-process mock of the managed backend
//!
//! Serves the table REST endpoint, auth, storage and the realtime websocket
//! from shared in-memory state. Row-level security is approximated: rows
//! carrying a `user_id` can only be written by that user.

mod realtime;
mod rest;
mod storage;

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alpaca_common::{AccessClaims, ClientConfig};
use alpaca_core::RecordId;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Public API key the mock accepts
pub const ANON_KEY: &str = "mock-anon-key";

/// Secret the mock signs access tokens with
pub const JWT_SECRET: &[u8] = b"mock-backend-secret";

/// Registered account
#[derive(Debug, Clone)]
pub(crate) struct MockUser {
    pub id: RecordId,
    pub email: String,
    pub password: String,
    pub refresh_token: String,
}

/// Stored file
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Shared state behind every route
pub(crate) struct MockState {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    users: Mutex<Vec<MockUser>>,
    objects: Mutex<HashMap<String, StoredObject>>,
    requests: Mutex<Vec<(String, String)>>,
    topics: Mutex<HashMap<String, usize>>,
    inserts: broadcast::Sender<Value>,
    failing_tables: Mutex<HashSet<String>>,
    reject_joins: AtomicBool,
    confirm_signups: AtomicBool,
}

impl MockState {
    fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            users: Mutex::new(Vec::new()),
            objects: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            topics: Mutex::new(HashMap::new()),
            inserts: broadcast::channel(256).0,
            failing_tables: Mutex::new(HashSet::new()),
            reject_joins: AtomicBool::new(false),
            confirm_signups: AtomicBool::new(false),
        }
    }

    fn record(&self, method: &str, target: &str) {
        self.requests
            .lock()
            .push((method.to_string(), target.to_string()));
    }

    /// User behind the request's bearer token, if it is a user token
    fn caller(headers: &HeaderMap) -> Option<RecordId> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        AccessClaims::peek(token).ok()?.user_id().ok()
    }

    fn insert_rows(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }

    fn profile(&self, user_id: &Value) -> Value {
        self.rows("profiles")
            .into_iter()
            .find(|p| p.get("id") == Some(user_id))
            .unwrap_or(Value::Null)
    }
}

/// Running mock backend
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    _handle: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::new());
        let app = router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// Base URL of the backend
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this backend
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.url(), ANON_KEY);
        config.http.timeout_secs = 5;
        config.realtime.join_timeout_ms = 2_000;
        config
    }

    // === Seeding ===

    /// Register an account with a profile row
    pub fn add_user(&self, email: &str, password: &str, username: Option<&str>) -> RecordId {
        let id = RecordId::random();
        self.state.users.lock().push(MockUser {
            id,
            email: email.to_string(),
            password: password.to_string(),
            refresh_token: format!("refresh-{id}"),
        });
        if let Some(username) = username {
            self.state.insert_rows(
                "profiles",
                vec![json!({"id": id, "username": username, "avatar_url": null})],
            );
        }
        id
    }

    pub fn add_channel(&self, name: &str) -> RecordId {
        let id = RecordId::random();
        self.state.insert_rows(
            "channels",
            vec![json!({"id": id, "name": name, "created_at": Utc::now().to_rfc3339()})],
        );
        id
    }

    /// Store a message row without notifying subscribers
    pub fn add_message(
        &self,
        id: RecordId,
        channel_id: RecordId,
        user_id: RecordId,
        content: &str,
        created_at: DateTime<Utc>,
    ) {
        self.state.insert_rows(
            "messages",
            vec![message_record(id, channel_id, user_id, content, created_at)],
        );
    }

    /// Deliver an insert to realtime subscribers without storing it
    pub fn push_insert(&self, record: Value) {
        let _ = self.state.inserts.send(record);
    }

    // === Behavior switches ===

    /// Answer reads of `table` with a server error
    pub fn fail_table(&self, table: &str) {
        self.state.failing_tables.lock().insert(table.to_string());
    }

    pub fn reject_joins(&self, reject: bool) {
        self.state.reject_joins.store(reject, Ordering::SeqCst);
    }

    /// Make sign-ups wait for email confirmation
    pub fn confirm_signups(&self, confirm: bool) {
        self.state.confirm_signups.store(confirm, Ordering::SeqCst);
    }

    // === Inspection ===

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state.rows(table)
    }

    /// How many requests hit `target` with `method`
    pub fn request_count(&self, method: &str, target: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|(m, t)| m == method && t == target)
            .count()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.state.objects.lock().get(key).cloned()
    }

    /// Topics with at least one joined socket
    pub fn joined_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .state
            .topics
            .lock()
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(topic, _)| topic.clone())
            .collect();
        topics.sort();
        topics
    }
}

/// Message row as the table stores it
pub fn message_record(
    id: RecordId,
    channel_id: RecordId,
    user_id: RecordId,
    content: &str,
    created_at: DateTime<Utc>,
) -> Value {
    json!({
        "id": id,
        "channel_id": channel_id,
        "user_id": user_id,
        "content": content,
        "created_at": created_at.to_rfc3339(),
    })
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route(
            "/rest/v1/:table",
            get(rest::select)
                .post(rest::insert)
                .patch(rest::update)
                .delete(rest::remove),
        )
        .route("/auth/v1/token", post(auth::token))
        .route("/auth/v1/signup", post(auth::sign_up))
        .route("/auth/v1/logout", post(auth::logout))
        .route(
            "/storage/v1/object/*path",
            get(storage::download).post(storage::upload),
        )
        .route("/realtime/v1/websocket", get(realtime::websocket))
        .with_state(state)
}
