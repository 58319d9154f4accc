//! The dispatch engine.
//!
//! An [`Engine`] owns a [`Resolver`] and turns `(method, url)` pairs into
//! [`Exchange`]s:
//!
//! ```text
//! url → Request → Resolver → Resolution → Chain::run → Exchange
//!                    │                        │
//!                    └── DispatchError ───────┴──→ status + error envelope
//! ```
//!
//! Every dispatch runs inside a `dispatch` span and records the standard
//! metrics from `waypoint_telemetry::metrics`.

use std::time::Instant;

use http::{Method, StatusCode};
use tracing::field;
use waypoint_config::{ActionDefinition, ApiDefinition, EndpointDefinition, WaypointConfig};
use waypoint_core::{
    ActionBinding, Api, DispatchError, DispatchResult, Endpoint, Request, Resolution, Resolver,
    Response, TraceEntry,
};
use waypoint_router::{MethodSet, Rule};
use waypoint_telemetry::metrics::{record_dispatch, record_routing_failure};

use crate::error::EngineError;
use crate::exchange::Exchange;
use crate::registry::ActionRegistry;

/// Routes requests to action chains.
///
/// An engine is immutable once built and can be shared between threads.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use waypoint::Engine;
/// use waypoint_core::fixtures;
///
/// let engine = Engine::builder().api(fixtures::northwind_api()).build();
///
/// let exchange = engine.get("http://localhost/northwind/mysql/orders/10248");
/// assert_eq!(exchange.status(), StatusCode::OK);
/// assert_eq!(exchange.trace_value(fixtures::MOCK_TRACE_KEY), Some("mysqlAction"));
///
/// let missing = engine.get("/northwind/oracle/orders");
/// assert_eq!(missing.status(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    resolver: Resolver,
    debug: bool,
    error_bodies: bool,
}

impl Engine {
    /// Creates an engine over `apis` with default settings.
    #[must_use]
    pub fn new(apis: Vec<Api>) -> Self {
        Self::builder().apis(apis).build()
    }

    /// Starts building an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Builds an engine from validated configuration, binding every action
    /// definition to a handler in `registry`.
    pub fn from_config(
        config: &WaypointConfig,
        registry: &ActionRegistry,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let mut builder = Self::builder()
            .debug(config.engine.debug)
            .error_bodies(config.engine.error_bodies);
        if let Some(mapping) = &config.engine.servlet_mapping {
            builder = builder.servlet_mapping(mapping);
        }
        for definition in &config.apis {
            builder = builder.api(build_api(definition, registry)?);
        }

        let engine = builder.build();
        tracing::info!(
            apis = engine.resolver.apis().len(),
            handlers = registry.len(),
            "engine built from configuration"
        );
        Ok(engine)
    }

    /// The underlying resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Returns true if exchanges keep their chain trace.
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Resolves `url` without running any action.
    pub fn resolve(&self, method: &Method, url: &str) -> DispatchResult<Resolution<'_>> {
        let request = parse_request(method.clone(), url)?;
        self.resolver.resolve(method, request.path())
    }

    /// Services a `GET` request.
    pub fn get(&self, url: &str) -> Exchange {
        self.service(Method::GET, url)
    }

    /// Parses `url` and services the request.
    pub fn service(&self, method: Method, url: &str) -> Exchange {
        match parse_request(method, url) {
            Ok(request) => self.service_request(request),
            Err(error) => {
                record_routing_failure(error.reason());
                tracing::debug!(url, error = %error, "rejected request url");
                self.fail(None, Response::new(), Vec::new(), error)
            }
        }
    }

    /// Resolves `request`, runs its chain and converts any failure into the
    /// response.
    pub fn service_request(&self, request: Request) -> Exchange {
        let started = Instant::now();
        let span = tracing::info_span!(
            "dispatch",
            request_id = %request.id(),
            http.method = %request.method(),
            http.path = %request.path(),
            api = field::Empty,
            endpoint = field::Empty,
        );
        let _entered = span.enter();

        let resolution = match self.resolver.resolve(request.method(), request.path()) {
            Ok(resolution) => resolution,
            Err(error) => {
                record_routing_failure(error.reason());
                tracing::info!(reason = error.reason(), error = %error, "request not routed");
                return self.fail(Some(request), Response::new(), Vec::new(), error);
            }
        };

        let (api, endpoint) = (resolution.api, resolution.endpoint);
        let (api, endpoint) = (api.label(), endpoint.name());
        span.record("api", api);
        span.record("endpoint", endpoint);

        let mut chain = resolution.into_chain(request).with_trace(self.debug);
        let outcome = chain.run();
        let (request, response, trace) = chain.into_parts();

        let exchange = match outcome {
            Ok(()) => Exchange::new(Some(request), response, trace, None),
            Err(error) => self.fail(Some(request), response, trace, error),
        };

        let elapsed = started.elapsed();
        record_dispatch(api, endpoint, exchange.status().as_u16(), elapsed);
        tracing::info!(
            http.status_code = exchange.status().as_u16(),
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "request dispatched"
        );

        exchange
    }

    fn fail(
        &self,
        request: Option<Request>,
        mut response: Response,
        trace: Vec<TraceEntry>,
        error: DispatchError,
    ) -> Exchange {
        response.set_status(failure_status(&error, &response));

        if self.error_bodies {
            let request_id = request.as_ref().map(|r| r.id().to_string());
            match serde_json::to_value(error.to_envelope(request_id.as_deref())) {
                Ok(body) => response.set_json(body),
                Err(e) => tracing::warn!(error = %e, "failed to render error envelope"),
            }
        }

        Exchange::new(request, response, trace, Some(error))
    }
}

// A handler's explicit status wins, then one the chain already set on the
// response. Everything else takes the error's default.
fn failure_status(error: &DispatchError, response: &Response) -> StatusCode {
    match error {
        DispatchError::ActionFailed { source, .. } => source
            .status()
            .or_else(|| response.has_explicit_status().then_some(response.status()))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        other => other.status_code(),
    }
}

fn parse_request(method: Method, url: &str) -> DispatchResult<Request> {
    Request::new(method, url).map_err(|source| DispatchError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Builder for [`Engine`].
#[derive(Debug)]
pub struct EngineBuilder {
    apis: Vec<Api>,
    servlet_mapping: Option<String>,
    debug: bool,
    error_bodies: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// Creates a builder with no Apis, trace recording on and error bodies on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            apis: Vec::new(),
            servlet_mapping: None,
            debug: true,
            error_bodies: true,
        }
    }

    /// Adds an Api. Apis are tried in the order they are added.
    #[must_use]
    pub fn api(mut self, api: Api) -> Self {
        self.apis.push(api);
        self
    }

    /// Adds several Apis.
    #[must_use]
    pub fn apis(mut self, apis: impl IntoIterator<Item = Api>) -> Self {
        self.apis.extend(apis);
        self
    }

    /// Sets the path prefix stripped before Api resolution.
    #[must_use]
    pub fn servlet_mapping(mut self, mapping: &str) -> Self {
        self.servlet_mapping = Some(mapping.to_string());
        self
    }

    /// Keeps or drops the chain trace in each exchange.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Renders error envelopes into failed responses.
    #[must_use]
    pub fn error_bodies(mut self, enabled: bool) -> Self {
        self.error_bodies = enabled;
        self
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> Engine {
        let mut resolver = Resolver::new(self.apis);
        if let Some(mapping) = &self.servlet_mapping {
            resolver = resolver.with_servlet_mapping(mapping);
        }
        Engine {
            resolver,
            debug: self.debug,
            error_bodies: self.error_bodies,
        }
    }
}

fn build_api(definition: &ApiDefinition, registry: &ActionRegistry) -> Result<Api, EngineError> {
    let mut api = match &definition.name {
        Some(name) => Api::new(name),
        None => Api::unnamed(),
    };
    if let Some(version) = &definition.version {
        api = api.with_version(version);
    }
    api = api.with_multi_tenant(definition.multi_tenant);

    let location = api.label().to_string();
    for action in &definition.actions {
        api = api.with_action(bind_action(action, registry, &location)?);
    }
    for endpoint in &definition.endpoints {
        api = api.with_endpoint(build_endpoint(endpoint, registry, &location)?);
    }
    Ok(api)
}

fn build_endpoint(
    definition: &EndpointDefinition,
    registry: &ActionRegistry,
    api: &str,
) -> Result<Endpoint, EngineError> {
    let location = format!("{api}/{}", definition.name);
    let rule = build_rule(
        &location,
        &definition.methods,
        &definition.include_paths,
        &definition.exclude_paths,
        definition.order,
    )?;
    let rule = definition
        .config
        .iter()
        .fold(rule, |rule, (key, value)| rule.with_config_value(key, value));

    let mut endpoint = Endpoint::new(&definition.name).with_rule(rule);
    if let Some(path) = &definition.path {
        endpoint = endpoint.with_path(path);
    }
    for action in &definition.actions {
        endpoint = endpoint.with_action(bind_action(action, registry, &location)?);
    }
    Ok(endpoint)
}

fn bind_action(
    definition: &ActionDefinition,
    registry: &ActionRegistry,
    parent: &str,
) -> Result<ActionBinding, EngineError> {
    let name = definition.binding_name();
    let location = format!("{parent}#{name}");

    let binding = registry
        .bind(&definition.handler, name)
        .ok_or_else(|| EngineError::unknown_handler(&definition.handler, &location))?;

    let rule = build_rule(
        &location,
        &definition.methods,
        &definition.include_paths,
        &definition.exclude_paths,
        definition.order,
    )?;
    let rule = definition
        .config
        .iter()
        .fold(rule, |rule, (key, value)| rule.with_config_value(key, value));

    Ok(binding.with_rule(rule))
}

fn build_rule(
    location: &str,
    methods: &[String],
    include_paths: &[String],
    exclude_paths: &[String],
    order: Option<i32>,
) -> Result<Rule, EngineError> {
    let methods = MethodSet::from_names(methods).map_err(|source| EngineError::InvalidMethod {
        location: location.to_string(),
        source,
    })?;

    let mut rule = Rule::new()
        .with_methods(methods)
        .with_order(order.unwrap_or(Rule::DEFAULT_ORDER));
    for pattern in include_paths {
        rule = rule.with_include_path(pattern.as_str());
    }
    for pattern in exclude_paths {
        rule = rule.with_exclude_path(pattern.as_str());
    }
    Ok(rule)
}
