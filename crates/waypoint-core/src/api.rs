//! Apis: named, optionally versioned groups of endpoints.

use crate::action::ActionBinding;
use crate::endpoint::Endpoint;

/// A named, optionally versioned and multi-tenant group of endpoints.
///
/// An Api owns the first segments of every path it serves: its name, then
/// its version if it has one, then a tenant segment if it is multi-tenant.
/// Api-wide actions apply to every endpoint that has no private actions.
///
/// # Example
///
/// ```
/// use waypoint_core::{Api, Endpoint};
///
/// let api = Api::new("northwind")
///     .with_version("v1")
///     .with_multi_tenant(true)
///     .with_endpoint(Endpoint::new("books").with_path("books/*"));
///
/// assert_eq!(api.name(), Some("northwind"));
/// assert_eq!(api.version(), Some("v1"));
/// assert!(api.is_multi_tenant());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Api {
    name: Option<String>,
    version: Option<String>,
    multi_tenant: bool,
    endpoints: Vec<Endpoint>,
    actions: Vec<ActionBinding>,
}

impl Api {
    /// Creates a named Api.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Creates an Api without a name.
    ///
    /// An unnamed Api only matches when it is the only one registered, and
    /// then it consumes no path segments.
    #[must_use]
    pub fn unnamed() -> Self {
        Self::default()
    }

    /// Sets the version segment.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Enables or disables the tenant segment.
    #[must_use]
    pub fn with_multi_tenant(mut self, multi_tenant: bool) -> Self {
        self.multi_tenant = multi_tenant;
        self
    }

    /// Appends an endpoint. Endpoints are tried in the order they were added.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Appends an Api-wide action.
    #[must_use]
    pub fn with_action(mut self, action: ActionBinding) -> Self {
        self.actions.push(action);
        self
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the name, or an empty string for an unnamed Api.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Returns the version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns true if a tenant segment follows the name and version.
    #[must_use]
    pub const fn is_multi_tenant(&self) -> bool {
        self.multi_tenant
    }

    /// Returns the endpoints in registration order.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Returns the Api-wide actions.
    #[must_use]
    pub fn actions(&self) -> &[ActionBinding] {
        &self.actions
    }
}
