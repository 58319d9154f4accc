//! Normalised paths and per-call matching cursors.
//!
//! A [`Path`] is an immutable list of non-empty segments. Leading, trailing
//! and duplicate `/` characters are dropped when a path is built, so
//! `"/a////b/"` and `"a/b"` are the same path.
//!
//! Matching never mutates a [`Path`] or a compiled pattern. Progress through
//! a path is tracked by a [`PathCursor`], a cheap `Copy` view that callers
//! allocate fresh for each match.

use std::fmt;

/// An immutable, normalised sequence of path segments.
///
/// # Example
///
/// ```rust
/// use waypoint_router::Path;
///
/// let path = Path::new("/a////b/////");
/// assert_eq!(path.to_string(), "a/b");
/// assert_eq!(path.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parses and normalises a `/`-separated path.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self {
            segments: split_segments(raw).map(ToString::to_string).collect(),
        }
    }

    /// Builds a path from already-split segments, dropping empty ones.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::<String>::into)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Returns the segments of this path.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the segment at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a cursor positioned at the first segment.
    #[must_use]
    pub fn cursor(&self) -> PathCursor<'_> {
        PathCursor::new(&self.segments)
    }

    /// Returns a new path made of this path followed by `other`.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<&[String]> for Path {
    fn from(segments: &[String]) -> Self {
        Self {
            segments: segments.to_vec(),
        }
    }
}

/// Splits `raw` on `/`, skipping empty segments.
pub(crate) fn split_segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('/').filter(|s| !s.is_empty())
}

/// A read position within a path's segments.
///
/// The cursor borrows the segments it walks and only ever moves forward.
/// Copying a cursor is how matchers "try" a prefix: they advance a copy and
/// write it back only when the whole prefix matched.
///
/// # Example
///
/// ```rust
/// use waypoint_router::Path;
///
/// let path = Path::new("api/v1/books");
/// let mut cursor = path.cursor();
///
/// assert_eq!(cursor.next_segment(), Some("api"));
/// assert_eq!(cursor.peek(), Some("v1"));
/// assert_eq!(cursor.remainder().to_string(), "v1/books");
/// assert_eq!(cursor.consumed().to_string(), "api");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCursor<'a> {
    segments: &'a [String],
    offset: usize,
}

impl<'a> PathCursor<'a> {
    /// Creates a cursor at the start of `segments`.
    #[must_use]
    pub fn new(segments: &'a [String]) -> Self {
        Self {
            segments,
            offset: 0,
        }
    }

    /// Returns the index of the next unread segment.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the next unread segment without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&'a str> {
        self.segments.get(self.offset).map(String::as_str)
    }

    /// Consumes and returns the next unread segment.
    pub fn next_segment(&mut self) -> Option<&'a str> {
        let segment = self.peek()?;
        self.offset += 1;
        Some(segment)
    }

    /// Skips up to `count` segments.
    pub fn advance(&mut self, count: usize) {
        self.offset = (self.offset + count).min(self.segments.len());
    }

    /// Moves the cursor past every remaining segment.
    pub fn advance_to_end(&mut self) {
        self.offset = self.segments.len();
    }

    /// Returns true once every segment has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.segments.len()
    }

    /// Returns the number of unread segments.
    #[must_use]
    pub fn remaining_len(&self) -> usize {
        self.segments.len().saturating_sub(self.offset)
    }

    /// Returns the unread segments.
    #[must_use]
    pub fn remaining(&self) -> &'a [String] {
        &self.segments[self.offset.min(self.segments.len())..]
    }

    /// Returns the unread segments as an owned path.
    #[must_use]
    pub fn remainder(&self) -> Path {
        Path::from(self.remaining())
    }

    /// Returns the segments consumed so far as an owned path.
    #[must_use]
    pub fn consumed(&self) -> Path {
        Path::from(&self.segments[..self.offset.min(self.segments.len())])
    }
}
