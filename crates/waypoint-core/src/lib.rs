//! # Waypoint Core
//!
//! The route model, resolver and action chain for Waypoint.
//!
//! - [`Api`], [`Endpoint`], [`ActionBinding`] - the routing graph, built once
//!   and shared read-only between requests
//! - [`Resolver`] - picks one Api, one endpoint and an ordered action list
//!   for a method and path
//! - [`Chain`] - runs the selected [`Action`]s for one request with a
//!   config view scoped to the running action
//! - [`DispatchError`] - routing and handler failures, mapped to HTTP statuses
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use waypoint_core::{fixtures, Api, ChainState, Endpoint, Request, Resolver};
//!
//! let resolver = Resolver::new(vec![Api::new("shop")
//!     .with_endpoint(Endpoint::new("books").with_path("books/*").with_action(fixtures::mock("list")))]);
//!
//! let request = Request::new(Method::GET, "http://localhost/shop/books/fiction/42").unwrap();
//! let resolution = resolver.resolve(request.method(), request.path()).unwrap();
//!
//! let mut chain = resolution.into_chain(request);
//! chain.run().unwrap();
//!
//! assert_eq!(chain.state(), ChainState::Completed);
//! assert_eq!(chain.request().collection_key(), Some("fiction"));
//! assert_eq!(chain.request().entity_key(), Some("42"));
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-core/0.1.0")]

mod action;
mod api;
mod chain;
mod endpoint;
mod error;
pub mod fixtures;
mod request;
mod resolver;
mod response;

pub use action::{Action, ActionBinding, Flow, FnAction};
pub use api::Api;
pub use chain::{Chain, ChainState, TraceEntry};
pub use endpoint::{Endpoint, EndpointMatch};
pub use error::{
    ActionError, DispatchError, DispatchResult, ErrorCategory, ErrorDetail, ErrorEnvelope,
};
pub use request::{Request, RequestId, RoutedPath};
pub use resolver::{Resolution, Resolver};
pub use response::Response;
