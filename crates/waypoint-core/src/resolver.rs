//! Api, endpoint and action selection.
//!
//! Resolution takes a method and a normalised path and walks three levels:
//!
//! 1. **Api**: strip the servlet mapping, then try each Api in registration
//!    order. A candidate must match the next segment by name, then its
//!    version (if any) exactly, then consumes a tenant segment if it is
//!    multi-tenant. The first surviving candidate wins.
//! 2. **Endpoint**: try each endpoint of that Api in registration order
//!    against the Api-relative path. The first one that matches wins. An
//!    endpoint whose path constraint rejects a segment is skipped; that
//!    violation is only reported if no later endpoint matches.
//! 3. **Actions**: take the endpoint's private actions, or the Api-wide
//!    actions if it has none, keep those whose rule matches the
//!    endpoint-relative subpath, and sort them by `(order, registration index)`.
//!
//! A [`Resolver`] holds no per-request state. It is safe to share between
//! threads and resolving the same input twice gives the same answer.

use std::cmp::Ordering;

use http::Method;
use waypoint_router::{Path, PathCursor, PathPattern};

use crate::action::ActionBinding;
use crate::api::Api;
use crate::chain::Chain;
use crate::endpoint::Endpoint;
use crate::error::{DispatchError, DispatchResult};
use crate::request::{Request, RoutedPath};

/// The outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution<'r> {
    /// The selected Api.
    pub api: &'r Api,
    /// The selected endpoint.
    pub endpoint: &'r Endpoint,
    /// The applicable actions, in run order.
    pub actions: Vec<&'r ActionBinding>,
    /// Path fields carved out along the way.
    pub route: RoutedPath,
}

impl<'r> Resolution<'r> {
    /// Returns the selected action names, in run order.
    #[must_use]
    pub fn action_names(&self) -> Vec<&'r str> {
        self.actions.iter().copied().map(ActionBinding::name).collect()
    }

    /// Records the route on `request` and builds a chain for it.
    ///
    /// A request that was already routed keeps its first route.
    #[must_use]
    pub fn into_chain(self, mut request: Request) -> Chain<'r> {
        if !request.set_route(self.route) {
            tracing::warn!(
                request_id = %request.id(),
                endpoint = self.endpoint.name(),
                "request already routed, keeping its first route"
            );
        }
        Chain::new(request, self.endpoint, self.actions)
    }
}

impl PartialEq for Resolution<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.api, other.api)
            && std::ptr::eq(self.endpoint, other.endpoint)
            && self.actions.len() == other.actions.len()
            && self
                .actions
                .iter()
                .zip(&other.actions)
                .all(|(a, b)| std::ptr::eq(*a, *b))
            && self.route == other.route
    }
}

/// Selects an Api, an endpoint and an action list for a request path.
///
/// # Example
///
/// ```
/// use http::Method;
/// use waypoint_core::{Api, Endpoint, Resolver};
/// use waypoint_router::Path;
///
/// let resolver = Resolver::new(vec![
///     Api::new("test").with_version("v1").with_endpoint(Endpoint::new("ep1").with_path("ep1/*")),
///     Api::new("test").with_version("v2").with_endpoint(Endpoint::new("ep2").with_path("ep2/*")),
/// ]);
///
/// let resolution = resolver.resolve(&Method::GET, &Path::new("test/v2/ep2/books/1")).unwrap();
/// assert_eq!(resolution.api.version(), Some("v2"));
/// assert_eq!(resolution.endpoint.name(), "ep2");
/// assert_eq!(resolution.route.subpath.to_string(), "books/1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    apis: Vec<Api>,
    servlet_mapping: PathPattern,
}

impl Resolver {
    /// Creates a resolver over `apis`, tried in the given order.
    #[must_use]
    pub fn new(apis: Vec<Api>) -> Self {
        Self {
            apis,
            servlet_mapping: PathPattern::default(),
        }
    }

    /// Sets a fixed path prefix that is stripped before Api selection.
    #[must_use]
    pub fn with_servlet_mapping(mut self, mapping: &str) -> Self {
        self.servlet_mapping = PathPattern::new(mapping);
        self
    }

    /// Appends an Api.
    pub fn push_api(&mut self, api: Api) {
        self.apis.push(api);
    }

    /// Returns the registered Apis.
    #[must_use]
    pub fn apis(&self) -> &[Api] {
        &self.apis
    }

    /// Returns the servlet mapping.
    #[must_use]
    pub fn servlet_mapping(&self) -> &PathPattern {
        &self.servlet_mapping
    }

    /// Selects an Api for the segments under `cursor`.
    ///
    /// On success the cursor is moved past the name, version and tenant
    /// segments, and the tenant is returned alongside the Api.
    pub fn match_api(&self, cursor: &mut PathCursor<'_>) -> Option<(&Api, Option<String>)> {
        let single_api = self.apis.len() == 1;

        for api in &self.apis {
            let mut probe = *cursor;

            match api.name() {
                Some(name) => match probe.next_segment() {
                    Some(segment) if segment.eq_ignore_ascii_case(name) => {}
                    _ => continue,
                },
                None if single_api => {}
                None => continue,
            }

            if let Some(version) = api.version() {
                if probe.next_segment() != Some(version) {
                    continue;
                }
            }

            let tenant = if api.is_multi_tenant() {
                probe.next_segment().map(str::to_string)
            } else {
                None
            };

            *cursor = probe;
            return Some((api, tenant));
        }

        None
    }

    /// Resolves a method and path to an Api, an endpoint and its actions.
    pub fn resolve(&self, method: &Method, path: &Path) -> DispatchResult<Resolution<'_>> {
        let mut cursor = path.cursor();

        if !self.servlet_mapping.extract(&mut cursor).is_matched() {
            return Err(DispatchError::NoApiMatch {
                path: path.to_string(),
            });
        }

        let Some((api, tenant)) = self.match_api(&mut cursor) else {
            tracing::debug!(path = %cursor.remainder(), "no api matched");
            return Err(DispatchError::NoApiMatch {
                path: cursor.remainder().to_string(),
            });
        };

        let api_path = cursor.consumed();
        let relative = cursor.remainder();

        // A constraint violation only fails resolution when no later endpoint matches.
        let mut refused = None;

        for endpoint in api.endpoints() {
            let matched = match endpoint.route(method, &relative) {
                Ok(Some(matched)) => matched,
                Ok(None) => continue,
                Err(violation) => {
                    tracing::debug!(
                        api = api.label(),
                        endpoint = endpoint.name(),
                        error = %violation,
                        "endpoint path constraint violated"
                    );
                    refused.get_or_insert((endpoint, violation));
                    continue;
                }
            };

            let actions = select_actions(api, endpoint, method, &matched.subpath);

            tracing::debug!(
                api = api.label(),
                endpoint = endpoint.name(),
                endpoint_path = %matched.endpoint_path,
                subpath = %matched.subpath,
                actions = actions.len(),
                "resolved endpoint"
            );

            return Ok(Resolution {
                api,
                endpoint,
                actions,
                route: RoutedPath {
                    api_path,
                    tenant,
                    endpoint_path: matched.endpoint_path,
                    subpath: matched.subpath,
                    params: matched.params,
                },
            });
        }

        if let Some((endpoint, violation)) = refused {
            return Err(DispatchError::ConstraintViolation {
                endpoint: endpoint.name().to_string(),
                violation,
            });
        }

        Err(DispatchError::NoEndpointMatch {
            api: api.label().to_string(),
            method: method.clone(),
            path: relative.to_string(),
        })
    }
}

fn select_actions<'r>(
    api: &'r Api,
    endpoint: &'r Endpoint,
    method: &Method,
    subpath: &Path,
) -> Vec<&'r ActionBinding> {
    let candidates = if endpoint.actions().is_empty() {
        api.actions()
    } else {
        endpoint.actions()
    };

    let mut selected: Vec<(usize, &ActionBinding)> = candidates
        .iter()
        .enumerate()
        .filter(|(_, action)| action.rule().matches(method, subpath))
        .collect();

    selected.sort_by(|(ia, a), (ib, b)| by_order(a, b).then(ia.cmp(ib)));
    selected.into_iter().map(|(_, action)| action).collect()
}

fn by_order(a: &ActionBinding, b: &ActionBinding) -> Ordering {
    a.rule().order().cmp(&b.rule().order())
}
