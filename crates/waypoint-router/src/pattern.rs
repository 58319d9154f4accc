//! Path pattern compiler and matcher.
//!
//! A pattern is a `/`-separated list of tokens:
//!
//! | Token | Segment | Matches |
//! |-------|---------|---------|
//! | `*` | [`Segment::Wildcard`] | every remaining segment |
//! | `books` | [`Segment::Literal`] | one segment, case-insensitively |
//! | `:id`, `{id}`, `${id}` | [`Segment::Variable`] | one segment, captured as `id` |
//! | `{id:[0-9]+}` | [`Segment::Variable`] | one segment fully matching the regex (case-insensitive) |
//! | `[token]` | [`Segment::Optional`] | `token`, or the end of the path |
//!
//! Compilation never fails. A token that looks like a variable but is not
//! well formed (an unterminated `{`, an empty name, a regex that does not
//! compile) is kept as literal text.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};

use crate::error::{ConstraintViolation, PatternError};
use crate::params::Params;
use crate::path::{split_segments, Path, PathCursor};

/// One compiled pattern token.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Exact text, compared case-insensitively.
    Literal(String),
    /// Consumes every remaining path segment. Only meaningful as the last token.
    Wildcard,
    /// Captures one path segment, optionally constrained by a regex.
    Variable(Variable),
    /// The wrapped token, or a successful stop if the path has run out.
    Optional(Box<Segment>),
}

/// A named capture with an optional regex constraint.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    constraint: Option<Constraint>,
}

#[derive(Debug, Clone)]
struct Constraint {
    source: String,
    regex: Regex,
}

impl Variable {
    /// Returns the capture name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the constraint regex as written in the pattern.
    #[must_use]
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_ref().map(|c| c.source.as_str())
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.constraint() == other.constraint()
    }
}

impl Eq for Variable {}

/// Outcome of testing one segment against one path value.
enum SegmentCheck<'p> {
    Accepted,
    Captured(&'p str),
    Mismatch,
    Violation(ConstraintViolation),
}

impl Segment {
    /// Compiles a single pattern token.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        if token.len() >= 2 && token.starts_with('[') && token.ends_with(']') {
            let inner = Self::parse(&token[1..token.len() - 1]);
            return match inner {
                optional @ Self::Optional(_) => optional,
                other => Self::Optional(Box::new(other)),
            };
        }

        if token == "*" {
            return Self::Wildcard;
        }

        if let Some(name) = token.strip_prefix(':') {
            if !name.is_empty() {
                return Self::Variable(Variable {
                    name: name.to_string(),
                    constraint: None,
                });
            }
            return Self::Literal(token.to_string());
        }

        let braced = token.strip_prefix('$').unwrap_or(token);
        if braced.len() >= 2 && braced.starts_with('{') && braced.ends_with('}') {
            if let Some(variable) = Self::parse_braced(&braced[1..braced.len() - 1]) {
                return Self::Variable(variable);
            }
        }

        Self::Literal(token.to_string())
    }

    fn parse_braced(body: &str) -> Option<Variable> {
        let (name, source) = match body.split_once(':') {
            Some((name, source)) => (name, Some(source)),
            None => (body, None),
        };

        if name.is_empty() {
            return None;
        }

        let constraint = match source {
            Some(source) => {
                let regex = RegexBuilder::new(&format!("^(?:{source})$"))
                    .case_insensitive(true)
                    .build()
                    .ok()?;
                Some(Constraint {
                    source: source.to_string(),
                    regex,
                })
            }
            None => None,
        };

        Some(Variable {
            name: name.to_string(),
            constraint,
        })
    }

    /// Returns true for an optional token.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Returns true for a wildcard, including an optional wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self.required(), Self::Wildcard)
    }

    /// Returns the token with any optional wrapper removed.
    #[must_use]
    pub fn required(&self) -> &Segment {
        match self {
            Self::Optional(inner) => inner.required(),
            other => other,
        }
    }

    fn check<'p>(&self, value: &'p str, position: usize) -> SegmentCheck<'p> {
        match self.required() {
            Self::Literal(text) => {
                if eq_ignore_case(text, value) {
                    SegmentCheck::Accepted
                } else {
                    SegmentCheck::Mismatch
                }
            }
            Self::Variable(variable) => match &variable.constraint {
                Some(constraint) if !constraint.regex.is_match(value) => {
                    SegmentCheck::Violation(ConstraintViolation {
                        position,
                        name: variable.name.clone(),
                        constraint: constraint.source.clone(),
                        value: value.to_string(),
                    })
                }
                _ => SegmentCheck::Captured(value),
            },
            Self::Wildcard | Self::Optional(_) => SegmentCheck::Accepted,
        }
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Wildcard, Self::Wildcard) => true,
            (Self::Variable(a), Self::Variable(b)) => a == b,
            (Self::Optional(a), Self::Optional(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Segment {}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Wildcard => f.write_str("*"),
            Self::Variable(v) => match v.constraint() {
                Some(source) => write!(f, "{{{}:{source}}}", v.name),
                None => write!(f, "{{{}}}", v.name),
            },
            Self::Optional(inner) => write!(f, "[{inner}]"),
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// The segments a successful match consumed and the variables it captured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// Variables captured along the way.
    pub params: Params,
    /// The path segments that were consumed.
    pub matched: Path,
}

/// Result of matching a pattern against a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// The pattern matched.
    Matched(Extraction),
    /// The path does not fit the pattern.
    NoMatch,
    /// A constrained variable rejected its segment.
    ConstraintViolation(ConstraintViolation),
}

impl PathMatch {
    /// Returns true for [`PathMatch::Matched`].
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Returns the extraction, if the pattern matched.
    #[must_use]
    pub fn into_extraction(self) -> Option<Extraction> {
        match self {
            Self::Matched(extraction) => Some(extraction),
            _ => None,
        }
    }
}

/// A compiled, immutable path pattern.
///
/// Patterns are safe to share between threads: matching only reads the
/// compiled segments and keeps its progress in a caller-owned
/// [`PathCursor`].
///
/// # Example
///
/// ```rust
/// use waypoint_router::{Path, PathPattern};
///
/// let pattern = PathPattern::new("part1/:part2/part3/*");
/// let path = Path::new("part1/val2/part3/part4");
///
/// let mut cursor = path.cursor();
/// let extraction = pattern.extract(&mut cursor).into_extraction().unwrap();
///
/// assert_eq!(extraction.params.get("part2"), Some("val2"));
/// assert_eq!(extraction.matched.to_string(), "part1/val2/part3");
/// assert_eq!(cursor.remainder().to_string(), "part4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles a pattern string.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let tokens: Vec<&str> = split_segments(pattern).collect();
        Self {
            raw: tokens.join("/"),
            segments: tokens.into_iter().map(Segment::parse).collect(),
        }
    }

    /// Returns the normalised pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the compiled segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the number of compiled segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true for the empty pattern, which only matches the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if the last token is a wildcard.
    #[must_use]
    pub fn ends_with_wildcard(&self) -> bool {
        self.segments.last().is_some_and(Segment::is_wildcard)
    }

    /// Consumes the fixed prefix of this pattern from `cursor`.
    ///
    /// Extraction walks the pattern until it reaches the first wildcard or
    /// optional token, or runs out of tokens. Every token before that point
    /// must match a path segment. On success the cursor is left on the first
    /// unconsumed segment; on any failure it is left untouched.
    pub fn extract(&self, cursor: &mut PathCursor<'_>) -> PathMatch {
        let mut probe = *cursor;
        let mut params = Params::new();
        let mut matched = Vec::new();

        for segment in &self.segments {
            if segment.is_wildcard() || segment.is_optional() {
                break;
            }

            let position = probe.offset();
            let Some(value) = probe.next_segment() else {
                return PathMatch::NoMatch;
            };

            match segment.check(value, position) {
                SegmentCheck::Accepted => {}
                SegmentCheck::Captured(value) => params.push(segment_name(segment), value),
                SegmentCheck::Mismatch => return PathMatch::NoMatch,
                SegmentCheck::Violation(violation) => {
                    return PathMatch::ConstraintViolation(violation)
                }
            }
            matched.push(value.to_string());
        }

        *cursor = probe;
        PathMatch::Matched(Extraction {
            params,
            matched: Path::from_segments(matched),
        })
    }

    /// Strict form of [`extract`](Self::extract) that reports failures as errors.
    pub fn try_extract(&self, cursor: &mut PathCursor<'_>) -> Result<Extraction, PatternError> {
        let path = cursor.remainder();
        match self.extract(cursor) {
            PathMatch::Matched(extraction) => Ok(extraction),
            PathMatch::NoMatch => Err(PatternError::NoMatch {
                pattern: self.raw.clone(),
                path: path.to_string(),
            }),
            PathMatch::ConstraintViolation(violation) => Err(violation.into()),
        }
    }

    /// Matches the whole of `path` against this pattern.
    ///
    /// A wildcard accepts everything after it. Once an optional token has been
    /// reached, running out of path is a successful match. A path with more
    /// segments than the pattern fails unless the pattern ends in a wildcard.
    #[must_use]
    pub fn match_path(&self, path: &Path) -> PathMatch {
        let mut cursor = path.cursor();
        let mut params = Params::new();
        let mut optional = false;

        for segment in &self.segments {
            if segment.is_wildcard() {
                return PathMatch::Matched(Extraction {
                    params,
                    matched: path.clone(),
                });
            }

            optional |= segment.is_optional();
            let position = cursor.offset();
            let Some(value) = cursor.next_segment() else {
                if optional {
                    return PathMatch::Matched(Extraction {
                        params,
                        matched: path.clone(),
                    });
                }
                return PathMatch::NoMatch;
            };

            match segment.check(value, position) {
                SegmentCheck::Accepted => {}
                SegmentCheck::Captured(value) => params.push(segment_name(segment), value),
                SegmentCheck::Mismatch => return PathMatch::NoMatch,
                SegmentCheck::Violation(violation) => {
                    return PathMatch::ConstraintViolation(violation)
                }
            }
        }

        if cursor.is_empty() {
            PathMatch::Matched(Extraction {
                params,
                matched: path.clone(),
            })
        } else {
            PathMatch::NoMatch
        }
    }

    /// Permissive boolean test: any failure, including a constraint
    /// violation, is `false`.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.match_path(path).is_matched()
    }
}

fn segment_name(segment: &Segment) -> String {
    match segment.required() {
        Segment::Variable(variable) => variable.name.clone(),
        _ => String::new(),
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PathPattern {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for PathPattern {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(pattern: &str, path: &str) -> (PathMatch, String) {
        let pattern = PathPattern::new(pattern);
        let path = Path::new(path);
        let mut cursor = path.cursor();
        let result = pattern.extract(&mut cursor);
        (result, cursor.remainder().to_string())
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(Segment::parse("*"), Segment::Wildcard);
        assert_eq!(Segment::parse("books"), Segment::Literal("books".to_string()));
        assert!(matches!(Segment::parse(":id"), Segment::Variable(v) if v.name() == "id"));
        assert!(matches!(Segment::parse("{id}"), Segment::Variable(v) if v.name() == "id"));
        assert!(matches!(Segment::parse("${id}"), Segment::Variable(v) if v.name() == "id"));
        assert!(Segment::parse("[books]").is_optional());
        assert!(Segment::parse("[*]").is_wildcard());
    }

    #[test]
    fn test_parse_constrained_variable() {
        let segment = Segment::parse("{part2:[0-9a-zA-Z]{1,8}}");
        match segment {
            Segment::Variable(v) => {
                assert_eq!(v.name(), "part2");
                assert_eq!(v.constraint(), Some("[0-9a-zA-Z]{1,8}"));
            }
            other => panic!("expected variable, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_tokens_are_literal() {
        assert_eq!(Segment::parse("{part2"), Segment::Literal("{part2".to_string()));
        assert_eq!(Segment::parse("{}"), Segment::Literal("{}".to_string()));
        assert_eq!(Segment::parse(":"), Segment::Literal(":".to_string()));
        assert_eq!(Segment::parse("{id:(}"), Segment::Literal("{id:(}".to_string()));
    }

    #[test]
    fn test_nested_optional_collapses() {
        let segment = Segment::parse("[[books]]");
        assert_eq!(
            segment,
            Segment::Optional(Box::new(Segment::Literal("books".to_string())))
        );
    }

    #[test]
    fn test_display_round_trips_canonical_form() {
        let pattern = PathPattern::new("/a//{b:[0-9]+}/[c]/*");
        assert_eq!(pattern.as_str(), "a/{b:[0-9]+}/[c]/*");
        let rendered: Vec<String> = pattern.segments().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["a", "{b:[0-9]+}", "[c]", "*"]);
    }

    #[test]
    fn test_extract_stops_on_wildcard() {
        let (result, remainder) = extract("part1/part2/*", "/part1/part2/part3/part4");
        let extraction = result.into_extraction().unwrap();
        assert!(extraction.params.is_empty());
        assert_eq!(extraction.matched.to_string(), "part1/part2");
        assert_eq!(remainder, "part3/part4");
    }

    #[test]
    fn test_extract_stops_on_optional() {
        let (result, remainder) = extract("part1/[part2]/part3/*", "/part1/part2/part3/part4");
        let extraction = result.into_extraction().unwrap();
        assert!(extraction.params.is_empty());
        assert_eq!(extraction.matched.to_string(), "part1");
        assert_eq!(remainder, "part2/part3/part4");
    }

    #[test]
    fn test_extract_variable_syntaxes() {
        for pattern in [
            "part1/:part2/part3/*",
            "part1/{part2}/part3/*",
            "part1/${part2}/part3/*",
            "part1/{part2:[0-9a-zA-Z]{1,8}}/part3/*",
        ] {
            let (result, remainder) = extract(pattern, "part1/val2/part3/part4");
            let extraction = result.into_extraction().unwrap();
            assert_eq!(extraction.params.len(), 1, "{pattern}");
            assert_eq!(extraction.params.get("part2"), Some("val2"), "{pattern}");
            assert_eq!(extraction.matched.to_string(), "part1/val2/part3", "{pattern}");
            assert_eq!(remainder, "part4", "{pattern}");
        }
    }

    #[test]
    fn test_extract_regex_violation() {
        let (result, remainder) = extract(
            "part1/{part2:[0-9a-zA-Z]{1,8}}/part3/*",
            "part1/23452345234523452345/part3/part4",
        );
        match result {
            PathMatch::ConstraintViolation(v) => {
                assert_eq!(v.name, "part2");
                assert_eq!(v.position, 1);
                assert_eq!(v.value, "23452345234523452345");
            }
            other => panic!("expected constraint violation, got {other:?}"),
        }
        assert_eq!(remainder, "part1/23452345234523452345/part3/part4");
    }

    #[test]
    fn test_extract_literal_mismatch() {
        let (result, remainder) = extract("part1/part2/part3/*", "part1/part5/part3/part4");
        assert_eq!(result, PathMatch::NoMatch);
        assert_eq!(remainder, "part1/part5/part3/part4");
    }

    #[test]
    fn test_extract_unterminated_brace_is_literal() {
        let (result, _) = extract("part1/{part2/part3/*", "part1/val2/part3/part4");
        assert_eq!(result, PathMatch::NoMatch);

        let (result, remainder) = extract("part1/{part2/part3/*", "part1/{part2/part3/part4");
        assert!(result.is_matched());
        assert_eq!(remainder, "part4");
    }

    #[test]
    fn test_extract_runs_out_of_path() {
        let (result, _) = extract("a/b/c", "a/b");
        assert_eq!(result, PathMatch::NoMatch);
    }

    #[test]
    fn test_try_extract_errors() {
        let pattern = PathPattern::new("part1/part2/part3/*");
        let path = Path::new("part1/part5/part3/part4");
        let err = pattern.try_extract(&mut path.cursor()).unwrap_err();
        assert!(matches!(err, PatternError::NoMatch { .. }));

        let pattern = PathPattern::new("part1/{part2:[0-9]{1,8}}/*");
        let path = Path::new("part1/abc");
        let err = pattern.try_extract(&mut path.cursor()).unwrap_err();
        assert!(matches!(err, PatternError::ConstraintViolation(_)));
    }

    #[test]
    fn test_literal_matching_is_case_insensitive() {
        let pattern = PathPattern::new("Books/*");
        assert!(pattern.matches(&Path::new("bOOKS/1")));
    }

    #[test]
    fn test_match_path_wildcards() {
        let pattern = PathPattern::new("*");
        assert!(pattern.matches(&Path::new("/something/asdfas/")));
        assert!(pattern.matches(&Path::new("")));

        let pattern = PathPattern::new("ep1/*");
        assert!(pattern.matches(&Path::new("ep1")));
        assert!(pattern.matches(&Path::new("ep1/a/b/c")));
        assert!(!pattern.matches(&Path::new("ep2/a")));
    }

    #[test]
    fn test_match_path_rejects_longer_path_without_wildcard() {
        let pattern = PathPattern::new("ep2");
        assert!(pattern.matches(&Path::new("ep2/")));
        assert!(!pattern.matches(&Path::new("ep2/asdf")));
    }

    #[test]
    fn test_match_path_regex_alternatives() {
        let pattern = PathPattern::new("something/{collection:books|customers}");
        assert!(pattern.matches(&Path::new("something/books")));
        assert!(pattern.matches(&Path::new("something/Books")));
        assert!(pattern.matches(&Path::new("something/customers")));
        assert!(!pattern.matches(&Path::new("something/blah")));
    }

    #[test]
    fn test_match_path_regex_lengths() {
        let pattern =
            PathPattern::new("something/{collection:books|customers}/{entity:[0-9a-fA-F]{1,8}}");
        assert!(pattern.matches(&Path::new("something/customers/11111111")));
        assert!(pattern.matches(&Path::new("something/customers/aaaaaaaa")));
        assert!(!pattern.matches(&Path::new("something/customers/aaaaaaaaaa")));
        assert!(!pattern.matches(&Path::new("something/customers/zzzzzzzz")));
    }

    #[test]
    fn test_match_path_optionals() {
        let pattern = PathPattern::new(
            "something/{collection:books|customers}/[{entity:[0-9]{1,8}}]/[{relationship:[a-zA-Z]*}]",
        );
        assert!(pattern.matches(&Path::new("something/customers/1234/")));
        assert!(pattern.matches(&Path::new("something/customers")));

        let strict = PathPattern::new(
            "something/{collection:books|customers}/{entity:[0-9]{1,8}}/{relationship:[a-zA-Z]*}",
        );
        assert!(!strict.matches(&Path::new("something/customers/1234/")));
        assert!(strict.matches(&Path::new("something/customers/1234/orders")));
    }

    #[test]
    fn test_optional_is_sticky_once_reached() {
        let pattern = PathPattern::new(
            "{collection:players|locations|ads}/[{entity:[0-9]{1,12}}]/{relationship:[a-z]*}",
        );
        assert!(pattern.matches(&Path::new("Locations/698/players")));
        assert!(pattern.matches(&Path::new("locations/698")));
    }

    #[test]
    fn test_match_path_captures() {
        let pattern = PathPattern::new("{collection}/[{entity}]");
        let extraction = pattern
            .match_path(&Path::new("books/42"))
            .into_extraction()
            .unwrap();
        assert_eq!(extraction.params.get("collection"), Some("books"));
        assert_eq!(extraction.params.get("entity"), Some("42"));
    }

    #[test]
    fn test_match_path_surfaces_violation_but_bool_refuses() {
        let pattern = PathPattern::new("{id:[0-9]+}");
        let path = Path::new("abc");
        assert!(matches!(
            pattern.match_path(&path),
            PathMatch::ConstraintViolation(_)
        ));
        assert!(!pattern.matches(&path));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty_path() {
        let pattern = PathPattern::new("/");
        assert!(pattern.is_empty());
        assert!(pattern.matches(&Path::new("")));
        assert!(!pattern.matches(&Path::new("a")));
    }
}
