//! Client configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;

/// Main client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub app: AppSettings,
    pub backend: BackendConfig,
    pub http: HttpConfig,
    pub realtime: RealtimeConfig,
    pub storage: StorageConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Hosted backend endpoint and public key
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL without trailing slash, e.g. `https://xyz.example.co`
    pub url: String,
    /// Public (anon) API key sent with every request
    pub anon_key: String,
}

impl BackendConfig {
    /// REST (table) endpoint
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// Auth endpoint
    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }

    /// File storage endpoint
    #[must_use]
    pub fn storage_url(&self) -> String {
        format!("{}/storage/v1", self.url)
    }

    /// Realtime websocket URL (`http` becomes `ws`, `https` becomes `wss`)
    #[must_use]
    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.url.clone()
        };
        format!(
            "{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            self.anon_key
        )
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

/// Realtime socket settings
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,
    /// Per-stream event buffer
    #[serde(default = "default_buffer")]
    pub buffer: usize,
}

/// Storage bucket names
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_notes_bucket")]
    pub notes_bucket: String,
}

// Default value functions
fn default_app_name() -> String {
    "alpaca-client".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_heartbeat_ms() -> u64 {
    30_000
}

fn default_join_timeout_ms() -> u64 {
    10_000
}

fn default_buffer() -> usize {
    256
}

fn default_notes_bucket() -> String {
    "notes".to_string()
}

impl ClientConfig {
    /// Configuration for a backend with every optional setting at its default
    #[must_use]
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: default_env(),
            },
            backend: BackendConfig {
                url: url.into().trim_end_matches('/').to_string(),
                anon_key: anon_key.into(),
            },
            http: HttpConfig {
                timeout_secs: default_http_timeout_secs(),
            },
            realtime: RealtimeConfig {
                heartbeat_ms: default_heartbeat_ms(),
                join_timeout_ms: default_join_timeout_ms(),
                buffer: default_buffer(),
            },
            storage: StorageConfig {
                notes_bucket: default_notes_bucket(),
            },
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup function
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };
        let parsed = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue(key, raw.clone()))
                })
                .transpose()
        };

        let url = required("ALPACA_BACKEND_URL")?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue("ALPACA_BACKEND_URL", url));
        }
        let anon_key = required("ALPACA_BACKEND_ANON_KEY")?;

        let mut config = Self::new(url, anon_key);
        if let Some(name) = lookup("APP_NAME") {
            config.app.name = name;
        }
        if let Some(env) = lookup("APP_ENV").and_then(|s| Environment::parse(&s)) {
            config.app.env = env;
        }
        if let Some(secs) = parsed("ALPACA_HTTP_TIMEOUT_SECS")? {
            config.http.timeout_secs = secs;
        }
        if let Some(ms) = parsed("ALPACA_REALTIME_HEARTBEAT_MS")? {
            config.realtime.heartbeat_ms = ms;
        }
        if let Some(ms) = parsed("ALPACA_REALTIME_JOIN_TIMEOUT_MS")? {
            config.realtime.join_timeout_ms = ms;
        }
        if let Some(buffer) = parsed("ALPACA_REALTIME_BUFFER")? {
            config.realtime.buffer = usize::try_from(buffer)
                .ok()
                .filter(|b| *b > 0)
                .ok_or_else(|| ConfigError::InvalidValue("ALPACA_REALTIME_BUFFER", buffer.to_string()))?;
        }
        if let Some(bucket) = lookup("ALPACA_NOTES_BUCKET") {
            config.storage.notes_bucket = bucket;
        }
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
