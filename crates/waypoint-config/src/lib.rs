//! # Waypoint Config
//!
//! Typed configuration for Waypoint.
//!
//! - [`WaypointConfig`] - engine settings, telemetry and route definitions
//! - [`ConfigLoader`] - defaults, then a TOML/JSON file, then `.env`, then
//!   `PREFIX__SECTION__KEY` environment overrides
//! - [`ApiDefinition`], [`EndpointDefinition`], [`ActionDefinition`] -
//!   declarative routes that the engine binds to registered handlers
//!
//! Unknown fields are rejected in every section.
//!
//! # Example
//!
//! ```
//! use waypoint_config::ConfigLoader;
//!
//! let toml = r#"
//!     [engine]
//!     servlet_mapping = "rest/*"
//!
//!     [[apis]]
//!     name = "northwind"
//!
//!     [[apis.endpoints]]
//!     name = "source"
//!     path = "source/*"
//!
//!     [[apis.endpoints.actions]]
//!     handler = "sql"
//!     config = { table = "orders" }
//! "#;
//!
//! let config = ConfigLoader::new().with_string(toml, "toml").unwrap().load().unwrap();
//! let endpoint = &config.apis[0].endpoints[0];
//! assert_eq!(endpoint.actions[0].config["table"], "orders");
//! ```

mod config;
mod error;
mod loader;
mod routes;

pub use config::{EngineConfig, WaypointConfig};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use routes::{ActionDefinition, ApiDefinition, EndpointDefinition};
pub use waypoint_telemetry::{LogConfig, LogFormat, MetricsConfig, TelemetryConfig};
