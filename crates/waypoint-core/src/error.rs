//! Error types for route resolution and action dispatch.
//!
//! Two error types cross this crate's boundary:
//!
//! - [`ActionError`] is what an [`Action`](crate::Action) returns when it
//!   fails. It may carry an explicit HTTP status.
//! - [`DispatchError`] is what the resolver and the chain return to the
//!   caller. Each variant maps to an [`ErrorCategory`] and from there to an
//!   HTTP status:
//!
//! | Variant | Category | Status |
//! |---|---|---|
//! | `InvalidUrl` | `BadRequest` | 400 |
//! | `NoApiMatch` | `BadRequest` | 400 |
//! | `ConstraintViolation` | `BadRequest` | 400 |
//! | `NoEndpointMatch` | `NotFound` | 404 |
//! | `ActionFailed` | `Internal` | 500, or the action's explicit status |

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Categories of dispatch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request does not address any registered Api, or addresses it badly.
    BadRequest,
    /// An Api matched but nothing inside it serves the request.
    NotFound,
    /// A handler failed.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the label used for this category in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }
}

/// Failure reported by an action handler.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use waypoint_core::ActionError;
///
/// let err = ActionError::new("table 'books' is read only").with_status(StatusCode::FORBIDDEN);
/// assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ActionError {
    message: String,
    status: Option<StatusCode>,
    #[source]
    source: Option<anyhow::Error>,
}

impl ActionError {
    /// Creates a failure with no explicit status.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Wraps an underlying error.
    pub fn from_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: Some(source.into()),
        }
    }

    /// Sets the HTTP status this failure should produce.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the explicit status, if one was set.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl From<anyhow::Error> for ActionError {
    fn from(source: anyhow::Error) -> Self {
        Self {
            message: source.to_string(),
            status: None,
            source: Some(source),
        }
    }
}

/// Failure to resolve or run a request.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The request URL could not be parsed.
    #[error("invalid request url '{url}': {source}")]
    InvalidUrl {
        /// The URL as received.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// No registered Api accepts the path's leading segments.
    #[error("no api matches path '{path}'")]
    NoApiMatch {
        /// The path after the servlet mapping was stripped.
        path: String,
    },

    /// An Api matched but none of its endpoints accept the request.
    #[error("no endpoint of api '{api}' matches {method} '{path}'")]
    NoEndpointMatch {
        /// Name of the matched Api.
        api: String,
        /// Request method.
        method: Method,
        /// The Api-relative path.
        path: String,
    },

    /// An endpoint path variable rejected its segment.
    #[error("endpoint '{endpoint}' refused the path: {violation}")]
    ConstraintViolation {
        /// Name of the endpoint whose pattern was violated.
        endpoint: String,
        /// What failed.
        #[source]
        violation: waypoint_router::ConstraintViolation,
    },

    /// An action handler failed.
    #[error("action '{action}' failed: {source}")]
    ActionFailed {
        /// Name of the failing action.
        action: String,
        /// The handler's error.
        #[source]
        source: ActionError,
    },
}

impl DispatchError {
    /// Creates an [`ActionFailed`](Self::ActionFailed) error.
    #[must_use]
    pub fn action_failed(action: impl Into<String>, source: ActionError) -> Self {
        Self::ActionFailed {
            action: action.into(),
            source,
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidUrl { .. }
            | Self::NoApiMatch { .. }
            | Self::ConstraintViolation { .. } => ErrorCategory::BadRequest,
            Self::NoEndpointMatch { .. } => ErrorCategory::NotFound,
            Self::ActionFailed { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status for this error.
    ///
    /// An action failure that carries an explicit status keeps it.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ActionFailed { source, .. } => source
                .status()
                .unwrap_or_else(|| self.category().default_status_code()),
            _ => self.category().default_status_code(),
        }
    }

    /// Returns true for the routing failures, as opposed to handler failures.
    #[must_use]
    pub const fn is_routing_failure(&self) -> bool {
        !matches!(self, Self::ActionFailed { .. })
    }

    /// Returns a short label used in logs and metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::NoApiMatch { .. } => "no_api_match",
            Self::NoEndpointMatch { .. } => "no_endpoint_match",
            Self::ConstraintViolation { .. } => "constraint_violation",
            Self::ActionFailed { .. } => "action_failed",
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                details: self.error_details(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::NoApiMatch { .. } => "NO_API_MATCH",
            Self::NoEndpointMatch { .. } => "NO_ENDPOINT_MATCH",
            Self::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            Self::ActionFailed { .. } => "ACTION_FAILED",
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::InvalidUrl { url, .. } => Some(serde_json::json!({ "url": url })),
            Self::NoApiMatch { path } => Some(serde_json::json!({ "path": path })),
            Self::NoEndpointMatch { api, method, path } => Some(serde_json::json!({
                "api": api,
                "method": method.as_str(),
                "path": path
            })),
            Self::ConstraintViolation {
                endpoint,
                violation,
            } => Some(serde_json::json!({
                "endpoint": endpoint,
                "variable": violation.name,
                "constraint": violation.constraint,
                "value": violation.value,
                "position": violation.position
            })),
            Self::ActionFailed { action, .. } => Some(serde_json::json!({ "action": action })),
        }
    }
}

/// Serializable error envelope for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
