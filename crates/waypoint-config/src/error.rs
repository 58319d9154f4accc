//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading, parsing or validating Waypoint configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required file layer does not exist.
    #[error("config file {path} does not exist")]
    FileNotFound {
        /// File that was asked for.
        path: PathBuf,
    },

    /// The file exists but reading it failed.
    #[error("cannot read config file {path}")]
    ReadError {
        /// File being read.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A TOML layer did not deserialize.
    #[error("invalid TOML config: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A JSON layer did not deserialize.
    #[error("invalid JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported file extension or format name.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A field holds a value that cannot be used.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted path of the field with the invalid value.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An override variable could not be parsed for its field.
    #[error("environment override {var}: {reason}")]
    EnvParseError {
        /// Full variable name, prefix included.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// A `.env` file exists but could not be loaded.
    #[error("failed to load .env file: {0}")]
    Dotenv(String),

    /// The merged configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::FileNotFound`].
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Shorthand for [`ConfigError::ReadError`].
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ConfigError::EnvParseError`].
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ConfigError::ValidationError`].
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_error() {
        let err = ConfigError::file_not_found("/path/to/waypoint.toml");
        assert!(err.to_string().contains("/path/to/waypoint.toml"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid_value("apis[0].endpoints[1].methods", "empty method name");
        assert!(err.to_string().contains("apis[0].endpoints[1].methods"));
        assert!(err.to_string().contains("empty method name"));
    }

    #[test]
    fn test_env_parse_error() {
        let err = ConfigError::env_parse_error("WAYPOINT__ENGINE__DEBUG", "expected boolean");
        assert!(err.to_string().contains("WAYPOINT__ENGINE__DEBUG"));
        assert!(err.to_string().contains("expected boolean"));
    }
}
