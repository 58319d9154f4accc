//! # Waypoint
//!
//! **REST route resolution and action dispatch**
//!
//! Waypoint maps a method and URL onto one Api, one endpoint within it and
//! an ordered list of actions, then runs those actions with a configuration
//! view scoped to whichever one is running.
//!
//! ```text
//! GET /rest/northwind/v1/acme/orders/10248
//!      │    │         │  │    └─────────── endpoint "orders/*", subpath "10248"
//!      │    │         │  └──────────────── tenant
//!      │    │         └─────────────────── version
//!      │    └───────────────────────────── Api name
//!      └────────────────────────────────── servlet mapping
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use http::StatusCode;
//! use waypoint::prelude::*;
//!
//! let engine = Engine::builder()
//!     .api(
//!         Api::new("northwind").with_endpoint(
//!             Endpoint::new("orders")
//!                 .with_path("orders/*")
//!                 .with_config("table=orders")
//!                 .with_action(ActionBinding::new(
//!                     "sql",
//!                     FnAction::new(|chain| {
//!                         let table = chain.config("table").unwrap_or_default().to_string();
//!                         let id = chain.request().collection_key().unwrap_or_default().to_string();
//!                         chain.response_mut().set_json(serde_json::json!({ "table": table, "id": id }));
//!                         Ok(Flow::Continue)
//!                     }),
//!                 )),
//!         ),
//!     )
//!     .build();
//!
//! let exchange = engine.get("/northwind/orders/10248");
//! assert_eq!(exchange.status(), StatusCode::OK);
//! assert_eq!(exchange.response().json().unwrap()["id"], "10248");
//! ```
//!
//! Engines can also be built from a [`WaypointConfig`](waypoint_config::WaypointConfig)
//! with [`Engine::from_config`], binding handler names through an
//! [`ActionRegistry`].

#![doc(html_root_url = "https://docs.rs/waypoint/0.1.0")]

mod engine;
mod error;
mod exchange;
mod registry;

pub use engine::{Engine, EngineBuilder};
pub use error::EngineError;
pub use exchange::Exchange;
pub use registry::ActionRegistry;

// Re-export the member crates
pub use waypoint_config as config;
pub use waypoint_core as core;
pub use waypoint_router as router;
pub use waypoint_telemetry as telemetry;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{ActionRegistry, Engine, EngineBuilder, EngineError, Exchange};

    pub use waypoint_core::{
        Action, ActionBinding, ActionError, Api, Chain, ChainState, DispatchError, Endpoint,
        Flow, FnAction, Request, Resolution, Resolver, Response,
    };

    pub use waypoint_router::{MethodSet, Path, PathPattern, Rule};

    pub use waypoint_config::{ConfigLoader, WaypointConfig};
}
