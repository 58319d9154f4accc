//! Path patterns and route rules for Waypoint.
//!
//! This crate holds the matching primitives the dispatcher is built on:
//!
//! - **[`Path`] / [`PathCursor`]**: normalised segment lists and a per-call
//!   read position into them
//! - **[`PathPattern`]**: a compiled pattern made of literals, wildcards,
//!   captured variables (optionally regex-constrained) and optional tokens
//! - **[`Rule`]**: a method filter plus include/exclude pattern lists, an order
//!   and a config map
//!
//! Compiled patterns and rules are immutable and can be shared freely between
//! threads. All matching state lives in the caller's [`PathCursor`].
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use waypoint_router::{Path, PathMatch, PathPattern, Rule};
//!
//! let pattern = PathPattern::new("{collection:books|authors}/[{entity:[0-9]+}]");
//!
//! match pattern.match_path(&Path::new("books/42")) {
//!     PathMatch::Matched(extraction) => {
//!         assert_eq!(extraction.params.get("collection"), Some("books"));
//!         assert_eq!(extraction.params.get("entity"), Some("42"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//!
//! // A value that breaks a regex is reported, not just refused.
//! assert!(matches!(
//!     pattern.match_path(&Path::new("books/forty-two")),
//!     PathMatch::ConstraintViolation(_)
//! ));
//!
//! let rule = Rule::new().with_include_paths("books/*").with_exclude_paths("books/secret");
//! assert!(rule.matches(&Method::GET, &Path::new("books/1")));
//! assert!(!rule.matches(&Method::GET, &Path::new("books/secret")));
//! ```

mod error;
mod methods;
mod params;
mod path;
mod pattern;
mod rule;

pub use error::{ConstraintViolation, PatternError};
pub use methods::MethodSet;
pub use params::Params;
pub use path::{Path, PathCursor};
pub use pattern::{Extraction, PathMatch, PathPattern, Segment, Variable};
pub use rule::Rule;
