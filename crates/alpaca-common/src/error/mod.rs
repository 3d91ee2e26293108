//! Error types

mod app_error;

pub use app_error::{AppError, AppResult, ErrorKind, Notification, NotificationVariant};
