//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the request logger and its demo server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServedLogConfig {
    /// Name attached to every `req_served` event as `app`.
    pub app_name: String,

    /// Process-wide `tracing` setup and event sink selection.
    pub logging: LoggingConfig,

    /// Correlation id handling.
    pub request_id: RequestIdConfig,

    /// HTTP server settings.
    pub server: ServerConfig,
}

impl Default for ServedLogConfig {
    fn default() -> Self {
        Self {
            app_name: "served-log".to_string(),
            logging: LoggingConfig::default(),
            request_id: RequestIdConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Output format of the `tracing` fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Where request events are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Through the installed `tracing` subscriber.
    #[default]
    Tracing,
    /// As JSON lines on stdout.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,

    /// `EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,

    pub sink: SinkKind,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "info".to_string(),
            sink: SinkKind::Tracing,
        }
    }
}

/// Correlation id configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestIdConfig {
    /// Assign and log a request id per request.
    pub enabled: bool,

    /// Header the id is read from and echoed back in.
    pub header: String,
}

impl Default for RequestIdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            header: "x-request-id".to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest accepted request body.
    pub max_body_bytes: usize,

    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}
