//! # alpaca-common
//!
//! Shared utilities including configuration, error handling, access tokens, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{session_from_tokens, AccessClaims, SessionToken};
pub use config::{
    AppSettings, BackendConfig, ClientConfig, ConfigError, Environment, HttpConfig,
    RealtimeConfig, StorageConfig,
};
pub use error::{AppError, AppResult, ErrorKind, Notification, NotificationVariant};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
