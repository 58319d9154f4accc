//! Engine construction errors.

use http::method::InvalidMethod;
use thiserror::Error;

/// Failure to build an [`Engine`](crate::Engine) from configuration.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A route definition names a handler the registry does not have.
    #[error("{location}: no handler registered as '{handler}'")]
    UnknownHandler {
        /// The missing handler name.
        handler: String,
        /// Where the definition sits (e.g. `northwind/books`).
        location: String,
    },

    /// A route definition lists a method that is not a valid token.
    #[error("{location}: invalid method list")]
    InvalidMethod {
        /// Where the definition sits.
        location: String,
        /// Parser error.
        #[source]
        source: InvalidMethod,
    },

    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] waypoint_config::ConfigError),
}

impl EngineError {
    /// Creates an [`UnknownHandler`](Self::UnknownHandler) error.
    pub fn unknown_handler(handler: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnknownHandler {
            handler: handler.into(),
            location: location.into(),
        }
    }
}
