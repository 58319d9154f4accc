//! Method and path filters shared by endpoints and actions.

use http::method::InvalidMethod;
use http::Method;
use indexmap::IndexMap;

use crate::methods::MethodSet;
use crate::params::Params;
use crate::path::Path;
use crate::pattern::{PathMatch, PathPattern};

/// A reusable method + path filter with an order and a config map.
///
/// A rule matches a request when:
///
/// 1. its method set is empty or contains the request method,
/// 2. its include list is empty or one of the include patterns matches the path,
/// 3. and none of its exclude patterns matches the path.
///
/// Path tests are permissive: a constrained variable that rejects its
/// segment simply fails that pattern.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use waypoint_router::{Path, Rule};
///
/// let rule = Rule::new()
///     .with_method_list("GET,PUT")
///     .unwrap()
///     .with_include_paths("cats/*,dogs/*")
///     .with_exclude_paths("dogs/rex");
///
/// assert!(rule.matches(&Method::GET, &Path::new("cats/tom")));
/// assert!(!rule.matches(&Method::GET, &Path::new("dogs/rex")));
/// assert!(!rule.matches(&Method::POST, &Path::new("cats/tom")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: Option<String>,
    methods: MethodSet,
    include_paths: Vec<PathPattern>,
    exclude_paths: Vec<PathPattern>,
    order: i32,
    config: IndexMap<String, String>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            name: None,
            methods: MethodSet::any(),
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
            order: Self::DEFAULT_ORDER,
            config: IndexMap::new(),
        }
    }
}

impl Rule {
    /// Order given to rules that do not set one.
    pub const DEFAULT_ORDER: i32 = 1000;

    /// Creates a rule that matches every method and path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rule name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the method filter.
    pub fn with_methods(mut self, methods: MethodSet) -> Self {
        self.methods = methods;
        self
    }

    /// Adds a single method to the filter.
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.insert(method);
        self
    }

    /// Adds every method in a comma-separated list.
    pub fn with_method_list(mut self, list: &str) -> Result<Self, InvalidMethod> {
        for method in MethodSet::parse(list)?.iter() {
            self.methods.insert(method.clone());
        }
        Ok(self)
    }

    /// Adds every pattern in a comma-separated list to the include list.
    ///
    /// Commas inside `{...}` belong to a regex and do not split the list.
    pub fn with_include_paths(mut self, list: &str) -> Self {
        for pattern in split_pattern_list(list) {
            push_unique(&mut self.include_paths, PathPattern::new(pattern));
        }
        self
    }

    /// Adds one pattern to the include list.
    pub fn with_include_path(mut self, pattern: impl Into<PathPattern>) -> Self {
        push_unique(&mut self.include_paths, pattern.into());
        self
    }

    /// Adds every pattern in a comma-separated list to the exclude list.
    pub fn with_exclude_paths(mut self, list: &str) -> Self {
        for pattern in split_pattern_list(list) {
            push_unique(&mut self.exclude_paths, PathPattern::new(pattern));
        }
        self
    }

    /// Adds one pattern to the exclude list.
    pub fn with_exclude_path(mut self, pattern: impl Into<PathPattern>) -> Self {
        push_unique(&mut self.exclude_paths, pattern.into());
        self
    }

    /// Sets the sort order. Lower runs first.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Merges `key=value` pairs from a URL query string into the config map.
    pub fn with_config(mut self, query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            self.config.insert(key.into_owned(), value.into_owned());
        }
        self
    }

    /// Sets a single config entry.
    pub fn with_config_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Returns the rule name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the method filter.
    #[must_use]
    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    /// Returns the include patterns.
    #[must_use]
    pub fn include_paths(&self) -> &[PathPattern] {
        &self.include_paths
    }

    /// Returns the exclude patterns.
    #[must_use]
    pub fn exclude_paths(&self) -> &[PathPattern] {
        &self.exclude_paths
    }

    /// Returns the sort order.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Returns the config map.
    #[must_use]
    pub fn config(&self) -> &IndexMap<String, String> {
        &self.config
    }

    /// Looks up one config entry.
    #[must_use]
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Returns true if `method` passes the method filter.
    #[must_use]
    pub fn allows_method(&self, method: &Method) -> bool {
        self.methods.allows(method)
    }

    /// Tests the method and path filters together.
    #[must_use]
    pub fn matches(&self, method: &Method, path: &Path) -> bool {
        self.allows_method(method) && self.match_path(path).is_some()
    }

    /// Tests only the include/exclude lists.
    ///
    /// Returns the variables captured by the include pattern that matched, or
    /// an empty set when the include list is empty.
    #[must_use]
    pub fn match_path(&self, path: &Path) -> Option<Params> {
        let params = if self.include_paths.is_empty() {
            Params::new()
        } else {
            self.include_paths
                .iter()
                .find_map(|pattern| match pattern.match_path(path) {
                    PathMatch::Matched(extraction) => Some(extraction.params),
                    _ => None,
                })?
        };

        if self.exclude_paths.iter().any(|pattern| pattern.matches(path)) {
            return None;
        }

        Some(params)
    }
}

fn push_unique(list: &mut Vec<PathPattern>, pattern: PathPattern) {
    if !list.iter().any(|p| p.as_str() == pattern.as_str()) {
        list.push(pattern);
    }
}

/// Splits a comma-separated pattern list, leaving commas inside braces alone.
fn split_pattern_list(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in list.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
