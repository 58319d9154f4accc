//! Test fixtures for Waypoint development and testing.
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use waypoint_core::{fixtures, Resolver};
//! use waypoint_router::Path;
//!
//! let resolver = Resolver::new(vec![fixtures::northwind_api()]);
//! let resolution = resolver.resolve(&Method::GET, &Path::new("northwind/source/orders")).unwrap();
//! assert_eq!(resolution.action_names(), vec!["sourceAction"]);
//! ```

use http::StatusCode;

use crate::action::{Action, ActionBinding, Flow};
use crate::api::Api;
use crate::chain::Chain;
use crate::endpoint::Endpoint;
use crate::error::ActionError;

/// Trace key every [`MockAction`] writes its label under.
pub const MOCK_TRACE_KEY: &str = "MockAction";

#[derive(Debug, Clone)]
enum Outcome {
    Continue,
    Stop,
    Fail(String),
}

/// An action that records its label in the chain trace and does little else.
///
/// It can be told to stop the chain, to fail, to set a status or to write a
/// JSON body.
#[derive(Debug, Clone)]
pub struct MockAction {
    label: String,
    outcome: Outcome,
    status: Option<StatusCode>,
    body: Option<serde_json::Value>,
}

impl MockAction {
    /// Creates a mock that continues the chain.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            outcome: Outcome::Continue,
            status: None,
            body: None,
        }
    }

    /// Makes the mock stop the chain.
    #[must_use]
    pub fn stopping(mut self) -> Self {
        self.outcome = Outcome::Stop;
        self
    }

    /// Makes the mock fail with `message`.
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.outcome = Outcome::Fail(message.into());
        self
    }

    /// Makes the mock set an explicit response status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Makes the mock write a JSON body.
    #[must_use]
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl Action for MockAction {
    fn run(&self, chain: &mut Chain<'_>) -> Result<Flow, ActionError> {
        chain.debug(MOCK_TRACE_KEY, self.label.clone());

        if let Some(status) = self.status {
            chain.response_mut().set_status(status);
        }
        if let Some(body) = &self.body {
            chain.response_mut().set_json(body.clone());
        }

        match &self.outcome {
            Outcome::Continue => Ok(Flow::Continue),
            Outcome::Stop => Ok(Flow::Stop),
            Outcome::Fail(message) => Err(ActionError::new(message.clone())),
        }
    }
}

/// Binds a [`MockAction`] whose label is also its binding name.
pub fn mock(name: &str) -> ActionBinding {
    ActionBinding::new(name, MockAction::new(name))
}

/// Creates a `northwind` Api with one endpoint per backend.
///
/// - `source/*` runs `sourceAction`
/// - `h2/*` runs `h2Action`
/// - `mysql/*` runs `mysqlAction`
/// - `dynamo/*` runs `dynamoAction`
#[must_use]
pub fn northwind_api() -> Api {
    ["source", "h2", "mysql", "dynamo"]
        .into_iter()
        .fold(Api::new("northwind"), |api, backend| {
            api.with_endpoint(
                Endpoint::new(backend)
                    .with_path(&format!("{backend}/*"))
                    .with_action(mock(&format!("{backend}Action"))),
            )
        })
}

/// Creates the three-version `test` Api set.
///
/// Each version `vN` has an endpoint `ep{2N-1}` on `*` that excludes
/// `subpath/*`, and an endpoint `ep{2N}` on `subpath/*`. Every version
/// carries an Api-wide `mock1` action.
#[must_use]
pub fn versioned_apis() -> Vec<Api> {
    (1..=3)
        .map(|n| {
            Api::new("test")
                .with_version(format!("v{n}"))
                .with_action(mock("mock1").with_include_paths("*"))
                .with_endpoint(
                    Endpoint::new(format!("ep{}", 2 * n - 1)).with_exclude_paths("subpath/*"),
                )
                .with_endpoint(Endpoint::new(format!("ep{}", 2 * n)).with_path("subpath/*"))
        })
        .collect()
}
