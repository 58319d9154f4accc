//! Captured path variables.
//!
//! Variables captured while matching a [`PathPattern`](crate::PathPattern)
//! are stored in insertion order using a small-vector so the common case
//! (a handful of captures) stays on the stack.

use smallvec::SmallVec;

/// Maximum number of captures stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Variables captured from a path, as ordered `(name, value)` pairs.
///
/// Lookups are by exact name. When the same name is captured twice, the
/// first capture wins for [`get`](Params::get) and both remain visible
/// through [`iter`](Params::iter).
///
/// # Example
///
/// ```rust
/// use waypoint_router::Params;
///
/// let mut params = Params::new();
/// params.push("collection", "books");
/// params.push("entity", "42");
///
/// assert_eq!(params.get("collection"), Some("books"));
/// assert_eq!(params.get("entity"), Some("42"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty capture set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured variable.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the first value captured under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if a variable named `name` was captured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.iter().any(|(n, _)| n == name)
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of captures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over captures in the order they were made.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(as_pair)
    }

    /// Moves every capture of `other` to the end of this set.
    pub fn append(&mut self, other: Params) {
        self.inner.extend(other.inner);
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner
            .iter()
            .map(as_pair as fn(&'a (String, String)) -> (&'a str, &'a str))
    }
}

fn as_pair((name, value): &(String, String)) -> (&str, &str) {
    (name.as_str(), value.as_str())
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
