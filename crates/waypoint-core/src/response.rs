//! The response an action chain builds up.

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

/// Response state shared by every action in a chain.
///
/// The status starts at `200 OK`. Setting it through
/// [`set_status`](Self::set_status) marks it explicit, which keeps it in place
/// if a later action fails.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
}

impl Response {
    /// Creates an empty `200 OK` response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Sets an explicit status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Returns true if an action set the status.
    #[must_use]
    pub const fn has_explicit_status(&self) -> bool {
        self.status.is_some()
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers for modification.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Sets a header, replacing any previous value.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Returns the JSON body.
    #[must_use]
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Replaces the JSON body.
    pub fn set_json(&mut self, body: serde_json::Value) {
        self.body = Some(body);
    }

    /// Removes and returns the body.
    pub fn take_json(&mut self) -> Option<serde_json::Value> {
        self.body.take()
    }
}
