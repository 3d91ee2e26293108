//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The backend answered with a non-success status, or was unreachable
    /// (`status` is `None` when no response arrived)
    #[error("Backend request failed{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("Realtime error: {0}")]
    Realtime(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    // =========================================================================
    // Validation / Authorization Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("You must be signed in to do that")]
    NotAuthenticated,

    // =========================================================================
    // Internal
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl DomainError {
    /// Shorthand for a transport failure with a response status
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Shorthand for a transport failure without a response (connect, timeout)
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Get an error code string for logs and notifications
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport { status: Some(401), .. } => "UNAUTHORIZED",
            Self::Transport { status: Some(403), .. } => "FORBIDDEN",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Realtime(_) => "REALTIME_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Response status carried by a transport failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
            || matches!(self, Self::Transport { status: Some(404), .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the backend (or the missing session) refused the operation
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::Transport { status: Some(401 | 403), .. }
        )
    }

    /// Check if this failure came from talking to the backend
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Realtime(_) | Self::Storage(_) | Self::Decode(_)
        )
    }
}
