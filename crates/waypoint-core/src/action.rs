//! The action handler trait and its routing metadata.
//!
//! An [`Action`] is an opaque unit of request handling: a SQL query, a cache
//! lookup, an auth check. The dispatcher never looks inside one. What it does
//! look at is the [`ActionBinding`] around it: a name, a handler, and a
//! [`Rule`] that decides which requests the handler applies to and supplies
//! its private config.

use std::fmt;
use std::sync::Arc;

use http::Method;
use waypoint_router::{MethodSet, Rule};

use crate::chain::Chain;
use crate::error::ActionError;

/// What the chain should do after an action returns successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next action.
    Continue,
    /// Skip every remaining action and complete the chain.
    Stop,
}

/// A request handler run as one step of a [`Chain`].
///
/// Handlers read the request, scoped config and trace through the chain they
/// are given, and write to its response.
///
/// # Example
///
/// ```
/// use waypoint_core::{Action, ActionError, Chain, Flow};
///
/// struct Hello;
///
/// impl Action for Hello {
///     fn run(&self, chain: &mut Chain<'_>) -> Result<Flow, ActionError> {
///         let greeting = chain.config_or("greeting", "hello").to_string();
///         chain.response_mut().set_json(serde_json::json!({ "message": greeting }));
///         Ok(Flow::Stop)
///     }
/// }
/// ```
pub trait Action: Send + Sync + 'static {
    /// Runs this action against the chain's request and response.
    fn run(&self, chain: &mut Chain<'_>) -> Result<Flow, ActionError>;
}

/// Adapts a closure into an [`Action`].
///
/// ```
/// use waypoint_core::{ActionBinding, Flow, FnAction};
///
/// let binding = ActionBinding::new(
///     "trace",
///     FnAction::new(|chain| {
///         chain.debug("trace", "visited");
///         Ok(Flow::Continue)
///     }),
/// );
/// assert_eq!(binding.name(), "trace");
/// ```
pub struct FnAction<F> {
    f: F,
}

impl<F> FnAction<F>
where
    F: Fn(&mut Chain<'_>) -> Result<Flow, ActionError> + Send + Sync + 'static,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Action for FnAction<F>
where
    F: Fn(&mut Chain<'_>) -> Result<Flow, ActionError> + Send + Sync + 'static,
{
    fn run(&self, chain: &mut Chain<'_>) -> Result<Flow, ActionError> {
        (self.f)(chain)
    }
}

/// A named handler plus the rule that filters and configures it.
#[derive(Clone)]
pub struct ActionBinding {
    name: String,
    handler: Arc<dyn Action>,
    rule: Rule,
}

impl ActionBinding {
    /// Binds `handler` under `name` with a rule that matches everything.
    pub fn new(name: impl Into<String>, handler: impl Action) -> Self {
        Self::from_arc(name, Arc::new(handler))
    }

    /// Binds a shared handler.
    pub fn from_arc(name: impl Into<String>, handler: Arc<dyn Action>) -> Self {
        let name = name.into();
        Self {
            rule: Rule::new().with_name(name.clone()),
            name,
            handler,
        }
    }

    /// Replaces the rule. The binding keeps its own name.
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rule = rule.with_name(self.name.clone());
        self
    }

    /// Replaces the method filter.
    #[must_use]
    pub fn with_methods(mut self, methods: MethodSet) -> Self {
        self.rule = self.rule.with_methods(methods);
        self
    }

    /// Adds a method to the filter.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.rule = self.rule.with_method(method);
        self
    }

    /// Adds comma-separated include patterns.
    #[must_use]
    pub fn with_include_paths(mut self, list: &str) -> Self {
        self.rule = self.rule.with_include_paths(list);
        self
    }

    /// Adds comma-separated exclude patterns.
    #[must_use]
    pub fn with_exclude_paths(mut self, list: &str) -> Self {
        self.rule = self.rule.with_exclude_paths(list);
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.rule = self.rule.with_order(order);
        self
    }

    /// Merges a `key=value&...` query string into the config.
    #[must_use]
    pub fn with_config(mut self, query: &str) -> Self {
        self.rule = self.rule.with_config(query);
        self
    }

    /// Sets one config entry.
    #[must_use]
    pub fn with_config_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.rule = self.rule.with_config_value(key, value);
        self
    }

    /// Returns the binding name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rule.
    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Action> {
        &self.handler
    }

    /// Runs the handler.
    pub fn run(&self, chain: &mut Chain<'_>) -> Result<Flow, ActionError> {
        self.handler.run(chain)
    }
}

impl fmt::Debug for ActionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBinding")
            .field("name", &self.name)
            .field("rule", &self.rule)
            .finish_non_exhaustive()
    }
}
