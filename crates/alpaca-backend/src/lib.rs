//! # alpaca-backend
//!
//! Backend layer implementing the repository, storage and auth ports over the
//! hosted backend's HTTP surface.
//!
//! ## Overview
//!
//! - Shared HTTP client construction and the table [`RestClient`]
//! - Wire models for rows that need reshaping, and their mappers
//! - Repository implementations for channels, messages, blog, journals,
//!   comments and notes
//! - [`StorageClient`] for note files and [`AuthClient`] for sessions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use alpaca_backend::{build_http_client, RestClient, RestMessageRepository};
//! use alpaca_common::{ClientConfig, SessionToken};
//!
//! let config = ClientConfig::from_env()?;
//! let http = build_http_client(&config)?;
//! let rest = RestClient::new(http, &config.backend, SessionToken::new());
//! let messages = RestMessageRepository::new(rest);
//! ```

pub mod auth;
pub mod client;
pub mod mappers;
pub mod models;
pub mod repositories;
pub mod storage;

// Re-export commonly used types
pub use auth::AuthClient;
pub use client::{build_http_client, Order, Query, RestClient};
pub use repositories::{
    RestBlogRepository, RestChannelRepository, RestCommentRepository, RestJournalRepository,
    RestMessageRepository, RestNoteRepository,
};
pub use storage::StorageClient;
