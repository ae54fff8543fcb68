//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServedLogConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate a TOML configuration document.
pub fn parse_config(content: &str) -> Result<ServedLogConfig, ConfigError> {
    let config: ServedLogConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServedLogConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Configuration for a process: the file at `path` (or defaults), with
/// `bind_address` overridden when given, validated as a whole.
pub fn resolve_config(
    path: Option<&Path>,
    bind_address: Option<&str>,
) -> Result<ServedLogConfig, ConfigError> {
    let mut config: ServedLogConfig = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ServedLogConfig::default(),
    };
    if let Some(bind_address) = bind_address {
        config.server.bind_address = bind_address.to_string();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, SinkKind};
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.app_name, "served-log");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.request_id.header, "x-request-id");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
app_name = "billing"

[logging]
format = "json"
sink = "json"

[server]
bind_address = "127.0.0.1:9000"
max_body_bytes = 4096
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.app_name, "billing");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.sink, SinkKind::Json);
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.server.max_body_bytes, 4096);
        assert_eq!(config.server.request_timeout_secs, 30);
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = parse_config("app_name = \"\"\n[server]\nmax_body_bytes = 0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: app_name must not be empty, server.max_body_bytes must be greater than 0"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/served-log.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_unknown_format_is_parse_error() {
        let err = parse_config("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = resolve_config(None, None).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_resolve_validates_bind_override() {
        let err = resolve_config(None, Some("not-an-address")).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(
                errors,
                vec![ValidationError::InvalidBindAddress("not-an-address".into())]
            ),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_resolve_override_fixes_file_address() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "app_name = \"billing\"\n[server]\nbind_address = \"nowhere\"\n").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
        let config = resolve_config(Some(file.path()), Some("127.0.0.1:9000")).unwrap();
        assert_eq!(config.app_name, "billing");
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
    }
}
