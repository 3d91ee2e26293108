//! Configuration structs

mod app_config;

pub use app_config::{
    AppSettings, BackendConfig, ClientConfig, ConfigError, Environment, HttpConfig,
    RealtimeConfig, StorageConfig,
};
