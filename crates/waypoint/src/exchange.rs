//! The result of servicing one request.

use http::StatusCode;
use waypoint_core::{DispatchError, Request, Response, TraceEntry};

/// A serviced request: what came in, what goes out and what happened.
#[derive(Debug)]
pub struct Exchange {
    request: Option<Request>,
    response: Response,
    trace: Vec<TraceEntry>,
    error: Option<DispatchError>,
}

impl Exchange {
    pub(crate) fn new(
        request: Option<Request>,
        response: Response,
        trace: Vec<TraceEntry>,
        error: Option<DispatchError>,
    ) -> Self {
        Self {
            request,
            response,
            trace,
            error,
        }
    }

    /// The request, or `None` if its URL could not be parsed.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// The response.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Shorthand for `response().status()`.
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// The error that ended dispatch, if any.
    pub fn error(&self) -> Option<&DispatchError> {
        self.error.as_ref()
    }

    /// Returns true if routing succeeded and no action failed.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Trace entries recorded by the chain. Empty when debug is off.
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Returns the first trace value recorded under `key`.
    pub fn trace_value(&self, key: &str) -> Option<&str> {
        self.trace
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Returns every trace value recorded under `key`, in order.
    pub fn trace_values<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a str> + 'k
    where
        'a: 'k,
    {
        self.trace
            .iter()
            .filter(move |entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Splits the exchange into its parts.
    pub fn into_parts(
        self,
    ) -> (
        Option<Request>,
        Response,
        Vec<TraceEntry>,
        Option<DispatchError>,
    ) {
        (self.request, self.response, self.trace, self.error)
    }
}
