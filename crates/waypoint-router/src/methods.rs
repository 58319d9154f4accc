//! HTTP method filters.
//!
//! A [`MethodSet`] is the method half of a [`Rule`](crate::Rule). Method names
//! are upper-cased before they are stored, so `"get"` and `"GET"` are the same
//! entry. An empty set allows every method.

use std::fmt;

use http::method::InvalidMethod;
use http::Method;
use smallvec::SmallVec;

/// A set of allowed HTTP methods.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use waypoint_router::MethodSet;
///
/// let methods = MethodSet::parse("get, post").unwrap();
/// assert!(methods.allows(&Method::GET));
/// assert!(methods.allows_str("Post"));
/// assert!(!methods.allows(&Method::DELETE));
///
/// assert!(MethodSet::any().allows(&Method::DELETE));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodSet {
    methods: SmallVec<[Method; 4]>,
}

impl MethodSet {
    /// An empty set, which allows any method.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list of method names.
    ///
    /// Blank entries are ignored.
    pub fn parse(list: &str) -> Result<Self, InvalidMethod> {
        let mut set = Self::default();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            set.insert(normalize(name)?);
        }
        Ok(set)
    }

    /// Builds a set from method names, upper-casing each one.
    pub fn from_names<I, S>(names: I) -> Result<Self, InvalidMethod>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() {
                set.insert(normalize(name)?);
            }
        }
        Ok(set)
    }

    /// Adds a method. Duplicates are ignored.
    pub fn insert(&mut self, method: Method) {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
    }

    /// Returns true if `method` passes this filter.
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|m| m.as_str().eq_ignore_ascii_case(method.as_str()))
    }

    /// Returns true if the method named `method` passes this filter.
    #[must_use]
    pub fn allows_str(&self, method: &str) -> bool {
        self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|m| m.as_str().eq_ignore_ascii_case(method))
    }

    /// Returns true if no method is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Iterates over the listed methods.
    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }
}

fn normalize(name: &str) -> Result<Method, InvalidMethod> {
    Method::from_bytes(name.to_ascii_uppercase().as_bytes())
}

impl FromIterator<Method> for MethodSet {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        let mut set = Self::default();
        for method in iter {
            set.insert(method);
        }
        set
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.methods.iter().map(Method::as_str).collect();
        f.write_str(&names.join(","))
    }
}
