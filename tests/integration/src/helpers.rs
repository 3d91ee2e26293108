//! Test helpers for integration tests
//!
//! Wires a [`ServiceContext`] to a running [`MockBackend`] and provides
//! polling for state that settles asynchronously (realtime deliveries).

use std::time::Duration;

use alpaca_common::try_init_tracing;
use alpaca_core::Session;
use alpaca_service::{AuthService, ServiceContext};
use anyhow::Result;

use crate::fixtures::PASSWORD;
use crate::mock::MockBackend;

/// Default time to wait for realtime deliveries
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(3);

/// Start a mock backend with tracing enabled
pub async fn start_backend() -> Result<MockBackend> {
    // Several tests share the process subscriber; only the first install wins
    let _ = try_init_tracing();
    MockBackend::start().await
}

/// Build a client context against `backend`
pub fn connect(backend: &MockBackend) -> Result<ServiceContext> {
    ServiceContext::connect(&backend.config()).map_err(|e| anyhow::anyhow!("connect: {e}"))
}

/// Sign `email` in on `ctx` with the fixture password
pub async fn sign_in(ctx: &ServiceContext, email: &str) -> Result<Session> {
    AuthService::new(ctx)
        .sign_in(crate::fixtures::sign_in_request(email, PASSWORD))
        .await
        .map_err(|e| anyhow::anyhow!("sign in {email}: {e}"))
}

/// Poll `condition` every 20ms until it holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
