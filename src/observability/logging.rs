//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for the process
//! - Select the request event sink from configuration
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config and environment (`RUST_LOG` wins)

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig, SinkKind};
use crate::observability::sink::{EventSink, JsonSink, TracingSink};

/// Failure to install the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Build the filter: `RUST_LOG` if set, otherwise the configured directive.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingInitError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.filter)?),
    }
}

/// Install the global `tracing` subscriber described by `config`.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).try_init()?,
        LogFormat::Compact => registry.with(tracing_subscriber::fmt::layer().compact()).try_init()?,
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init()?,
    }

    Ok(())
}

/// The request event sink selected by `config`.
pub fn build_sink(config: &LoggingConfig) -> Arc<dyn EventSink> {
    match config.sink {
        SinkKind::Tracing => Arc::new(TracingSink),
        SinkKind::Json => Arc::new(JsonSink::new(io::stdout())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            filter: "served_log=loud".into(),
            ..Default::default()
        };
        assert!(matches!(env_filter(&config), Err(LoggingInitError::Filter(_))));
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(LoggingInitError::Init(_))));
    }
}
