//! Inbound requests and the path fields extracted while routing them.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;
use waypoint_router::{Params, Path};

/// A unique identifier for a request.
///
/// Request IDs are UUID v7, so they sort by creation time.
///
/// # Example
///
/// ```
/// use waypoint_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Path fields carved out of a request URL by the resolver.
///
/// `api_path` includes the servlet mapping and every segment consumed while
/// selecting the Api (name, version, tenant). `endpoint_path` is the prefix
/// consumed by the endpoint's own path pattern. `subpath` is what remains;
/// its first three segments are exposed as the collection, entity and
/// sub-collection keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutedPath {
    /// Servlet mapping plus Api name, version and tenant segments.
    pub api_path: Path,
    /// Tenant segment, for multi-tenant Apis.
    pub tenant: Option<String>,
    /// Prefix consumed by the endpoint path.
    pub endpoint_path: Path,
    /// Endpoint-relative remainder.
    pub subpath: Path,
    /// Variables captured by the endpoint path and its matching include pattern.
    pub params: Params,
}

impl RoutedPath {
    /// First subpath segment.
    #[must_use]
    pub fn collection_key(&self) -> Option<&str> {
        self.subpath.get(0)
    }

    /// Second subpath segment.
    #[must_use]
    pub fn entity_key(&self) -> Option<&str> {
        self.subpath.get(1)
    }

    /// Third subpath segment.
    #[must_use]
    pub fn subcollection_key(&self) -> Option<&str> {
        self.subpath.get(2)
    }
}

/// An inbound request as seen by the dispatcher.
///
/// # Example
///
/// ```
/// use http::Method;
/// use waypoint_core::Request;
///
/// let request = Request::new(Method::GET, "http://localhost:8080/northwind/books?limit=10").unwrap();
/// assert_eq!(request.path().to_string(), "northwind/books");
/// assert_eq!(request.query("limit"), Some("10"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    id: RequestId,
    method: Method,
    url: String,
    path: Path,
    query: IndexMap<String, String>,
    headers: HeaderMap,
    body: Option<String>,
    route: Option<RoutedPath>,
}

impl Request {
    /// Parses a request URL.
    ///
    /// Absolute URLs, absolute paths and relative paths are all accepted.
    /// The path is split on `/` as written: empty segments are dropped, but
    /// `.` and `..` are ordinary segments and nothing is percent-decoded.
    /// The query string is decoded into [`query`](Self::query); the fragment
    /// is dropped.
    pub fn new(method: Method, url: &str) -> Result<Self, url::ParseError> {
        let target = url.split_once('#').map_or(url, |(target, _)| target);
        let (target, query) = match target.split_once('?') {
            Some((target, query)) => (target, Some(query)),
            None => (target, None),
        };

        let raw_path = match target.split_once("://") {
            Some((scheme, rest)) if is_scheme(scheme) => {
                Url::parse(url)?;
                rest.find('/').map_or("", |start| &rest[start..])
            }
            _ => target,
        };

        let query = query
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            id: RequestId::new(),
            method,
            url: url.to_string(),
            path: Path::new(raw_path),
            query,
            headers: HeaderMap::new(),
            body: None,
            route: None,
        })
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URL as received.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the normalised URL path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a decoded query parameter.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns every decoded query parameter, in URL order.
    #[must_use]
    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.query
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns the routed path fields, once the request has been resolved.
    #[must_use]
    pub fn route(&self) -> Option<&RoutedPath> {
        self.route.as_ref()
    }

    /// Records the routed path fields.
    ///
    /// Fields are written once. A second call leaves the first route in place
    /// and returns false.
    #[must_use]
    pub fn set_route(&mut self, route: RoutedPath) -> bool {
        if self.route.is_some() {
            return false;
        }
        self.route = Some(route);
        true
    }

    /// Returns the Api path.
    #[must_use]
    pub fn api_path(&self) -> Option<&Path> {
        self.route.as_ref().map(|r| &r.api_path)
    }

    /// Returns the endpoint path.
    #[must_use]
    pub fn endpoint_path(&self) -> Option<&Path> {
        self.route.as_ref().map(|r| &r.endpoint_path)
    }

    /// Returns the endpoint-relative subpath.
    #[must_use]
    pub fn subpath(&self) -> Option<&Path> {
        self.route.as_ref().map(|r| &r.subpath)
    }

    /// Returns the tenant, for multi-tenant Apis.
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.route.as_ref().and_then(|r| r.tenant.as_deref())
    }

    /// Returns the collection key.
    #[must_use]
    pub fn collection_key(&self) -> Option<&str> {
        self.route.as_ref().and_then(RoutedPath::collection_key)
    }

    /// Returns the entity key.
    #[must_use]
    pub fn entity_key(&self) -> Option<&str> {
        self.route.as_ref().and_then(RoutedPath::entity_key)
    }

    /// Returns the sub-collection key.
    #[must_use]
    pub fn subcollection_key(&self) -> Option<&str> {
        self.route.as_ref().and_then(RoutedPath::subcollection_key)
    }

    /// Returns a captured path variable.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.route.as_ref().and_then(|r| r.params.get(name))
    }
}

// RFC 3986: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
