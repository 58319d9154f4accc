//! Named action handlers for config-built engines.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use waypoint_core::{Action, ActionBinding};

/// Maps handler names to action implementations.
///
/// Route definitions refer to handlers by name; [`Engine::from_config`]
/// looks each one up here.
///
/// [`Engine::from_config`]: crate::Engine::from_config
///
/// # Example
///
/// ```
/// use waypoint::ActionRegistry;
/// use waypoint_core::fixtures::MockAction;
///
/// let registry = ActionRegistry::new().with("audit", MockAction::new("audit"));
/// assert!(registry.contains("audit"));
/// assert!(registry.get("sql").is_none());
/// ```
#[derive(Default, Clone)]
pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`, replacing any earlier entry.
    pub fn register(&mut self, name: impl Into<String>, handler: impl Action) -> &mut Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Registers an already shared handler.
    pub fn register_arc(&mut self, name: impl Into<String>, handler: Arc<dyn Action>) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, handler: impl Action) -> Self {
        self.register(name, handler);
        self
    }

    /// Looks up a handler.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.handlers.get(name)
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterates over registered names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Binds the handler registered as `handler` under `binding_name`.
    pub fn bind(&self, handler: &str, binding_name: &str) -> Option<ActionBinding> {
        self.get(handler)
            .map(|action| ActionBinding::from_arc(binding_name, Arc::clone(action)))
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ActionRegistry")
            .field("handlers", &names)
            .finish()
    }
}
