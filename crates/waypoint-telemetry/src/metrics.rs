//! Prometheus metrics for Waypoint.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `waypoint_requests_total` | Counter | `api`, `endpoint`, `status` | Dispatched requests |
//! | `waypoint_dispatch_duration_seconds` | Histogram | `api`, `endpoint` | Resolve and chain latency |
//! | `waypoint_routing_failures_total` | Counter | `reason` | Requests that matched no route |
//!
//! Recording goes through the `metrics` facade, so the helpers below are
//! no-ops until a recorder is installed.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Counter of dispatched requests.
pub const REQUESTS_TOTAL: &str = "waypoint_requests_total";

/// Histogram of dispatch latency.
pub const DISPATCH_DURATION: &str = "waypoint_dispatch_duration_seconds";

/// Counter of routing failures.
pub const ROUTING_FAILURES_TOTAL: &str = "waypoint_routing_failures_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether metrics are recorded.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Histogram buckets for dispatch duration, in seconds.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: default_duration_buckets(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_duration_buckets() -> Vec<f64> {
    vec![
        0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
    ]
}

/// Renders the installed Prometheus recorder.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Wraps an existing handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Returns the registry for the global recorder, if one was installed.
    pub fn global() -> Option<Self> {
        METRICS_HANDLE.get().cloned().map(Self::new)
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder.
///
/// No HTTP listener is started; scrape output comes from
/// [`MetricsRegistry::render`]. Returns `None` when metrics are disabled.
/// Calling this again after a successful install returns the existing
/// registry.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }
    if let Some(registry) = MetricsRegistry::global() {
        return Ok(Some(registry));
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(DISPATCH_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let handle = METRICS_HANDLE.get_or_init(|| handle).clone();
    describe_metrics();

    Ok(Some(MetricsRegistry::new(handle)))
}

/// Renders the global recorder, or `None` if metrics were never initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for the standard metrics with the current recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of dispatched requests");
    describe_histogram!(
        DISPATCH_DURATION,
        Unit::Seconds,
        "Time spent resolving a route and running its action chain"
    );
    describe_counter!(
        ROUTING_FAILURES_TOTAL,
        "Requests that matched no Api, no endpoint or violated a path constraint"
    );
}

/// Records one dispatched request.
pub fn record_dispatch(api: &str, endpoint: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "api" => api.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        DISPATCH_DURATION,
        "api" => api.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a request that failed to resolve.
pub fn record_routing_failure(reason: &'static str) {
    counter!(ROUTING_FAILURES_TOTAL, "reason" => reason).increment(1);
}
