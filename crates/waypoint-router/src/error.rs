//! Pattern matching error types.

use thiserror::Error;

/// A regex-constrained variable was present but its value failed the regex.
///
/// This is reported separately from an ordinary mismatch so callers can
/// explain *why* a route was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value '{value}' at segment {position} does not satisfy '{constraint}' for variable '{name}'")]
pub struct ConstraintViolation {
    /// Index of the offending segment within the matched path.
    pub position: usize,
    /// Name of the constrained variable.
    pub name: String,
    /// The constraint regex as written in the pattern.
    pub constraint: String,
    /// The path segment that failed the constraint.
    pub value: String,
}

/// Errors returned by the strict (`Result`-returning) matching entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The path does not fit the pattern.
    #[error("path '{path}' does not match pattern '{pattern}'")]
    NoMatch {
        /// The pattern as written.
        pattern: String,
        /// The path that was tested.
        path: String,
    },

    /// A constrained variable rejected its segment.
    #[error(transparent)]
    ConstraintViolation(#[from] ConstraintViolation),
}
