//! Shared HTTP client construction

use alpaca_common::ClientConfig;
use alpaca_core::DomainError;
use std::time::Duration;

/// Build the HTTP client shared by the REST, storage and auth clients
pub fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, DomainError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .user_agent(format!("{}/{}", config.app.name, env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DomainError::Internal(format!("failed to build HTTP client: {e}")))
}
