//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Parse error: {0}")]
    Parse(toml::de::Error),

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

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[workers]\nmax_workers = 4\n\n[listener]\nport = 5050").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.workers.max_workers, 4);
        assert_eq!(config.listener.port, 5050);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.protocol.max_request_bytes, 8 * 1024);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = parse_config("[protocol]\nmax_request_bytes = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert_eq!(
            err.to_string(),
            "Validation failed: protocol.max_request_bytes must be greater than zero"
        );
    }

    #[test]
    fn every_validation_problem_is_listed() {
        let err = parse_config("[listener]\nhost = \"\"\n[protocol]\nmax_request_bytes = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: listener.host must not be empty, \
             protocol.max_request_bytes must be greater than zero"
        );
    }

    #[test]
    fn syntax_errors_surface_as_parse() {
        let err = parse_config("[listener\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
