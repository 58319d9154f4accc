//! Top-level configuration types.

use serde::{Deserialize, Serialize};
use waypoint_telemetry::logging::create_env_filter;
use waypoint_telemetry::{LogFormat, TelemetryConfig};

use crate::routes::{validate_apis, ApiDefinition};
use crate::ConfigError;

/// Complete Waypoint configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use waypoint_config::WaypointConfig;
///
/// let config = WaypointConfig::default();
/// assert!(config.engine.debug);
/// assert!(config.apis.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct WaypointConfig {
    /// Dispatch engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Route definitions.
    #[serde(default)]
    pub apis: Vec<ApiDefinition>,
}

/// Dispatch engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Fixed path prefix stripped before Api resolution (e.g. `rest/*`).
    #[serde(default)]
    pub servlet_mapping: Option<String>,

    /// Keep each request's chain trace in its exchange.
    #[serde(default = "default_true")]
    pub debug: bool,

    /// Render an error envelope into failed responses.
    #[serde(default = "default_true")]
    pub error_bodies: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            servlet_mapping: None,
            debug: true,
            error_bodies: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl WaypointConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The log level is not a valid filter directive set
    /// - Two Apis share a name and version
    /// - An unnamed Api is registered alongside others
    /// - An action has no handler or a method is not a valid token
    pub fn validate(&self) -> Result<(), ConfigError> {
        let logging = &self.telemetry.logging;
        if logging.enabled {
            create_env_filter(&logging.level).map_err(|e| {
                ConfigError::invalid_value("telemetry.logging.level", e.to_string())
            })?;
        }

        if self.telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.service_name",
                "must not be empty",
            ));
        }

        validate_apis(&self.apis)
    }

    /// Development preset: debug logging in pretty form.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config
    }

    /// Production preset: JSON logs, no traces kept, no error bodies.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.format = LogFormat::Json;
        config.engine.debug = false;
        config.engine.error_bodies = false;
        config
    }
}
