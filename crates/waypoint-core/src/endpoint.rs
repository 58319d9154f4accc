//! Endpoints: a path prefix, a rule and a private action list.

use http::method::InvalidMethod;
use http::Method;
use waypoint_router::{
    ConstraintViolation, MethodSet, Params, Path, PathMatch, PathPattern, Rule,
};

use crate::action::ActionBinding;

/// What an endpoint carved out of an Api-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMatch {
    /// Segments consumed by the endpoint path prefix.
    pub endpoint_path: Path,
    /// The rest of the Api-relative path.
    pub subpath: Path,
    /// Variables captured by the endpoint path and the include pattern that matched.
    pub params: Params,
}

/// A routable group of actions inside an Api.
///
/// The endpoint `path` names a prefix. When matching, the fixed part of the
/// path (everything before the first wildcard or optional token) is consumed
/// as the endpoint path, and the include/exclude lists are tested against
/// what remains. An endpoint without include paths instead requires its
/// whole path pattern to match the Api-relative path.
///
/// # Example
///
/// ```
/// use http::Method;
/// use waypoint_core::Endpoint;
/// use waypoint_router::Path;
///
/// let endpoint = Endpoint::new("pets")
///     .with_path("petstore/*")
///     .with_exclude_paths("rat");
///
/// let matched = endpoint.route(&Method::GET, &Path::new("petstore/dogs/1234")).unwrap().unwrap();
/// assert_eq!(matched.endpoint_path.to_string(), "petstore");
/// assert_eq!(matched.subpath.to_string(), "dogs/1234");
///
/// assert!(endpoint.route(&Method::GET, &Path::new("petstore/rat")).unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Endpoint {
    name: String,
    path: PathPattern,
    rule: Rule,
    actions: Vec<ActionBinding>,
}

impl Endpoint {
    /// Creates an endpoint that accepts every path and method.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            rule: Rule::new().with_name(name.clone()),
            path: PathPattern::new("*"),
            name,
            actions: Vec::new(),
        }
    }

    /// Sets the endpoint path pattern.
    #[must_use]
    pub fn with_path(mut self, pattern: &str) -> Self {
        self.path = PathPattern::new(pattern);
        self
    }

    /// Replaces the rule. The endpoint keeps its own name.
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

    /// Adds every method in a comma-separated list.
    pub fn with_method_list(mut self, list: &str) -> Result<Self, InvalidMethod> {
        self.rule = self.rule.with_method_list(list)?;
        Ok(self)
    }

    /// Adds comma-separated include patterns, tested against the subpath.
    #[must_use]
    pub fn with_include_paths(mut self, list: &str) -> Self {
        self.rule = self.rule.with_include_paths(list);
        self
    }

    /// Adds comma-separated exclude patterns, tested against the subpath.
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

    /// Adds a private action. Endpoints with private actions ignore the
    /// Api-wide action list.
    #[must_use]
    pub fn with_action(mut self, action: ActionBinding) -> Self {
        self.actions.push(action);
        self
    }

    /// Returns the endpoint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the endpoint path pattern.
    #[must_use]
    pub fn path(&self) -> &PathPattern {
        &self.path
    }

    /// Returns the rule.
    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Returns the private actions.
    #[must_use]
    pub fn actions(&self) -> &[ActionBinding] {
        &self.actions
    }

    /// Matches this endpoint against a method and an Api-relative path.
    ///
    /// Returns `Ok(None)` when the endpoint does not apply, and an error when
    /// a constrained variable in the endpoint path rejected its segment.
    pub fn route(
        &self,
        method: &Method,
        path: &Path,
    ) -> Result<Option<EndpointMatch>, ConstraintViolation> {
        if !self.rule.allows_method(method) {
            return Ok(None);
        }

        let mut cursor = path.cursor();
        let prefix = match self.path.extract(&mut cursor) {
            PathMatch::Matched(extraction) => extraction,
            PathMatch::NoMatch => return Ok(None),
            PathMatch::ConstraintViolation(violation) => return Err(violation),
        };
        let subpath = cursor.remainder();

        let mut params = if self.rule.include_paths().is_empty() {
            match self.path.match_path(path) {
                PathMatch::Matched(full) => full.params,
                PathMatch::NoMatch => return Ok(None),
                PathMatch::ConstraintViolation(violation) => return Err(violation),
            }
        } else {
            prefix.params
        };

        let Some(included) = self.rule.match_path(&subpath) else {
            return Ok(None);
        };
        params.append(included);

        Ok(Some(EndpointMatch {
            endpoint_path: prefix.matched,
            subpath,
            params,
        }))
    }
}
