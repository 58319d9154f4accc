//! Per-request action execution.
//!
//! A [`Chain`] owns one request and its response for the lifetime of a
//! dispatch. It runs the resolved actions in order, one at a time, and gives
//! the running action a config view scoped to itself:
//!
//! 1. the running action's own config,
//! 2. then the endpoint's config.
//!
//! Config belonging to other actions in the same chain is never visible.
//!
//! ```text
//!  Pending ──run()──▶ Running(0) ──▶ Running(1) ──▶ … ──▶ Completed
//!                          │              │
//!                          └──────────────┴── error ──▶ Failed
//! ```

use std::fmt;

use crate::action::{ActionBinding, Flow};
use crate::endpoint::Endpoint;
use crate::error::{DispatchError, DispatchResult};
use crate::request::Request;
use crate::response::Response;

/// Where a chain is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Built but not started.
    Pending,
    /// Running the action at this index.
    Running(usize),
    /// Every action ran, or one of them stopped the chain.
    Completed,
    /// An action failed. Later actions did not run.
    Failed,
}

/// One diagnostic entry recorded through [`Chain::debug`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Entry key.
    pub key: String,
    /// Entry value.
    pub value: String,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

/// Sequential executor for the actions selected for one request.
///
/// # Example
///
/// ```
/// use http::Method;
/// use waypoint_core::{ActionBinding, Chain, ChainState, Endpoint, Flow, FnAction, Request};
///
/// let endpoint = Endpoint::new("books").with_config("table=books");
/// let action = ActionBinding::new(
///     "sql",
///     FnAction::new(|chain| {
///         let table = chain.config("table").unwrap_or_default();
///         chain.debug("table", table);
///         Ok(Flow::Continue)
///     }),
/// );
///
/// let request = Request::new(Method::GET, "/books").unwrap();
/// let mut chain = Chain::new(request, &endpoint, vec![&action]);
/// chain.run().unwrap();
///
/// assert_eq!(chain.state(), ChainState::Completed);
/// assert_eq!(chain.trace_value("table"), Some("books"));
/// ```
pub struct Chain<'a> {
    request: Request,
    response: Response,
    endpoint: &'a Endpoint,
    actions: Vec<&'a ActionBinding>,
    cursor: usize,
    state: ChainState,
    trace: Vec<TraceEntry>,
    trace_enabled: bool,
}

impl<'a> Chain<'a> {
    /// Creates a pending chain.
    #[must_use]
    pub fn new(request: Request, endpoint: &'a Endpoint, actions: Vec<&'a ActionBinding>) -> Self {
        Self {
            request,
            response: Response::new(),
            endpoint,
            actions,
            cursor: 0,
            state: ChainState::Pending,
            trace: Vec::new(),
            trace_enabled: true,
        }
    }

    /// Turns trace recording on or off. Entries are still emitted as
    /// `tracing` events either way.
    #[must_use]
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }

    /// Runs every pending action in order.
    ///
    /// A chain runs once. Calling this again after it left
    /// [`ChainState::Pending`] does nothing.
    pub fn run(&mut self) -> DispatchResult<()> {
        if self.state != ChainState::Pending {
            return Ok(());
        }

        while self.cursor < self.actions.len() {
            let action = self.actions[self.cursor];
            self.state = ChainState::Running(self.cursor);
            self.debug("Action", action.name());

            match action.run(self) {
                Ok(Flow::Continue) => self.cursor += 1,
                Ok(Flow::Stop) => {
                    tracing::debug!(action = action.name(), "action stopped the chain");
                    break;
                }
                Err(error) => {
                    tracing::warn!(
                        request_id = %self.request.id(),
                        action = action.name(),
                        error = %error,
                        "action failed"
                    );
                    self.state = ChainState::Failed;
                    return Err(DispatchError::action_failed(action.name(), error));
                }
            }
        }

        self.state = ChainState::Completed;
        Ok(())
    }

    /// Looks up a config value for the running action.
    ///
    /// The action's own config shadows the endpoint's. Absent keys return
    /// `None`, which is distinct from an empty value.
    #[must_use]
    pub fn config(&self, key: &str) -> Option<&'a str> {
        self.current_action()
            .and_then(|action| action.rule().config_value(key))
            .or_else(|| self.endpoint.rule().config_value(key))
    }

    /// Looks up a config value, falling back to `default`.
    #[must_use]
    pub fn config_or<'d>(&self, key: &str, default: &'d str) -> &'d str
    where
        'a: 'd,
    {
        self.config(key).unwrap_or(default)
    }

    /// Records a diagnostic entry.
    pub fn debug(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let entry = TraceEntry {
            key: key.into(),
            value: value.into(),
        };
        tracing::debug!(
            request_id = %self.request.id(),
            key = %entry.key,
            value = %entry.value,
            "chain trace"
        );
        if self.trace_enabled {
            self.trace.push(entry);
        }
    }

    /// Returns the request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the response.
    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Returns the response for modification.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Returns the endpoint this chain serves.
    #[must_use]
    pub fn endpoint(&self) -> &'a Endpoint {
        self.endpoint
    }

    /// Returns the actions, in run order.
    #[must_use]
    pub fn actions(&self) -> &[&'a ActionBinding] {
        &self.actions
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ChainState {
        self.state
    }

    /// Returns the index of the next action to run.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the name of the running action.
    #[must_use]
    pub fn action_name(&self) -> Option<&'a str> {
        self.current_action().map(ActionBinding::name)
    }

    /// Returns the recorded trace.
    #[must_use]
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Returns the value of the first trace entry recorded under `key`.
    #[must_use]
    pub fn trace_value(&self, key: &str) -> Option<&str> {
        self.trace
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Consumes the chain, returning the request, response and trace.
    #[must_use]
    pub fn into_parts(self) -> (Request, Response, Vec<TraceEntry>) {
        (self.request, self.response, self.trace)
    }

    fn current_action(&self) -> Option<&'a ActionBinding> {
        match self.state {
            ChainState::Running(index) => self.actions.get(index).copied(),
            _ => None,
        }
    }
}

impl fmt::Debug for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("request_id", &self.request.id())
            .field("endpoint", &self.endpoint.name())
            .field("actions", &self.actions.iter().map(|a| a.name()).collect::<Vec<_>>())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
