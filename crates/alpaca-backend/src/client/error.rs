//! Error handling utilities for backend responses

use alpaca_core::DomainError;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Error body returned by the backend services
///
/// The REST service uses `message`/`details`/`hint`, the auth service
/// `error_description` or `msg`, and storage `error`/`message`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ErrorBody {
    /// Best human-readable description
    pub fn summary(&self) -> Option<String> {
        let headline = [&self.message, &self.error_description, &self.msg, &self.error]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())?;

        Some(match self.details.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(details) => format!("{headline} ({details})"),
            None => headline.to_string(),
        })
    }
}

/// Build the transport error for a failed response body
pub fn error_from_body(status: u16, body: &str) -> DomainError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.summary())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        });
    DomainError::transport(status, message)
}

/// Convert a reqwest error to DomainError
pub fn map_http_error(e: reqwest::Error) -> DomainError {
    if e.is_decode() {
        return DomainError::Decode(e.to_string());
    }
    DomainError::Transport {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

/// Pass successful responses through, turn the rest into errors
pub async fn check_response(response: Response) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = error_from_body(status.as_u16(), &body);
    tracing::warn!(status = status.as_u16(), error = %err, "Backend request rejected");
    Err(err)
}

/// Check the status and decode a JSON body
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, DomainError> {
    let response = check_response(response).await?;
    let bytes = response.bytes().await.map_err(map_http_error)?;
    serde_json::from_slice(&bytes).map_err(|e| DomainError::Decode(e.to_string()))
}
