//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits and timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServedLogConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServedLogConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("app_name must not be empty")]
    EmptyAppName,

    #[error("invalid logging.filter {0:?}")]
    InvalidFilter(String),

    #[error("invalid request_id.header {0:?}")]
    InvalidHeader(String),

    #[error("invalid server.bind_address {0:?}")]
    InvalidBindAddress(String),

    #[error("server.max_body_bytes must be greater than 0")]
    ZeroBodyLimit,

    #[error("server.request_timeout_secs must be greater than 0")]
    ZeroTimeout,
}

/// Check `config` for values serde accepts but the server cannot use.
pub fn validate_config(config: &ServedLogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.app_name.trim().is_empty() {
        errors.push(ValidationError::EmptyAppName);
    }

    if EnvFilter::try_new(&config.logging.filter).is_err() {
        errors.push(ValidationError::InvalidFilter(config.logging.filter.clone()));
    }

    if config.request_id.enabled && HeaderName::try_from(config.request_id.header.as_str()).is_err()
    {
        errors.push(ValidationError::InvalidHeader(config.request_id.header.clone()));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }

    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
