//! Observability for Waypoint.
//!
//! - **Logging**: structured `tracing` output in JSON, pretty or compact form
//! - **Metrics**: Prometheus-format metrics via the `metrics` facade
//!
//! The dispatch engine emits `tracing` events and `metrics` samples
//! unconditionally; this crate decides where they go.
//!
//! # Example
//!
//! ```rust,ignore
//! use waypoint_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let guard = init_telemetry(TelemetryConfig::default())?;
//!
//! if let Some(metrics) = guard.metrics() {
//!     println!("{}", metrics.render());
//! }
//! ```

pub mod error;
pub mod logging;
pub mod metrics;

use serde::{Deserialize, Serialize};

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use metrics::{init_metrics, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LogConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LogConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

fn default_service_name() -> String {
    "waypoint".to_string()
}

/// Handle to the telemetry subsystems initialized by [`init_telemetry`].
#[derive(Debug, Default)]
pub struct TelemetryGuard {
    metrics: Option<MetricsRegistry>,
}

impl TelemetryGuard {
    /// Creates a guard around an optional metrics registry.
    #[must_use]
    pub fn new(metrics: Option<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    /// Returns the metrics registry if metrics are enabled.
    pub fn metrics(&self) -> Option<&MetricsRegistry> {
        self.metrics.as_ref()
    }
}

/// Initializes logging, then metrics.
pub fn init_telemetry(config: TelemetryConfig) -> TelemetryResult<TelemetryGuard> {
    init_logging(&config.logging)?;
    let metrics = init_metrics(&config.metrics)?;

    tracing::info!(
        service.name = %config.service_name,
        metrics_enabled = metrics.is_some(),
        "Telemetry initialized"
    );

    Ok(TelemetryGuard::new(metrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "waypoint");
        assert!(config.logging.enabled);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_guard_without_metrics() {
        let guard = TelemetryGuard::default();
        assert!(guard.metrics().is_none());
    }

    #[test]
    fn test_disabled_telemetry_is_noop() {
        let config = TelemetryConfig {
            logging: LogConfig {
                enabled: false,
                ..LogConfig::default()
            },
            metrics: MetricsConfig {
                enabled: false,
                ..MetricsConfig::default()
            },
            ..TelemetryConfig::default()
        };
        let guard = init_telemetry(config).unwrap();
        assert!(guard.metrics().is_none());
    }

    #[test]
    fn test_nested_sections_deserialize() {
        let config: TelemetryConfig = serde_json::from_str(
            r#"{"service_name": "books", "logging": {"level": "debug"}, "metrics": {"enabled": false}}"#,
        )
        .unwrap();
        assert_eq!(config.service_name, "books");
        assert_eq!(config.logging.level, "debug");
        assert!(!config.metrics.enabled);
    }
}
