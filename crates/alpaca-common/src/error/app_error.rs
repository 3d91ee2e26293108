//! Application error types
//!
//! Unified error handling for the entire client, plus the transient
//! notification shown to the user when an operation fails.

use alpaca_core::DomainError;
use serde::Serialize;
use std::fmt;

use crate::config::ConfigError;

/// Broad class of a failure, used to pick a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network or backend failure
    Transport,
    /// Client-side form constraint
    Validation,
    /// Backend refused the operation, or no session
    Authorization,
    /// Missing or malformed configuration
    Configuration,
    Internal,
}

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Authentication errors
    #[error("Invalid token")]
    InvalidToken,

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidToken => ErrorKind::Authorization,
            Self::NotFound(_) => ErrorKind::Transport,
            Self::Config(_) => ErrorKind::Configuration,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Domain(e) => {
                if e.is_authorization() {
                    ErrorKind::Authorization
                } else if e.is_validation() {
                    ErrorKind::Validation
                } else if e.is_transport() || e.is_not_found() {
                    ErrorKind::Transport
                } else {
                    ErrorKind::Internal
                }
            }
        }
    }

    /// Get error code for logs and notifications
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Create a not found error for a resource type
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Visual style of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationVariant {
    #[default]
    Default,
    Destructive,
}

/// A transient user-facing message (toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    /// Success notification
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    /// Error notification with the error's message as description
    pub fn failure(title: impl Into<String>, err: &AppError) -> Self {
        Self {
            title: title.into(),
            description: err.to_string(),
            variant: NotificationVariant::Destructive,
        }
    }

    /// Whether this notification reports a failure
    pub fn is_destructive(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}

impl From<&AppError> for Notification {
    fn from(err: &AppError) -> Self {
        let title = match err.kind() {
            ErrorKind::Authorization => "Not allowed",
            _ => "Error",
        };
        let description = match err {
            // Validation messages are already phrased for the user
            AppError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };
        Self {
            title: title.to_string(),
            description,
            variant: NotificationVariant::Destructive,
        }
    }
}

impl From<AppError> for Notification {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}
