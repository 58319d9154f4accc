//! Declarative route definitions.
//!
//! These are plain serde structs. Turning them into a routing graph needs a
//! handler registry and lives in the `waypoint` facade.
//!
//! ```toml
//! [[apis]]
//! name = "northwind"
//! version = "v1"
//!
//! [[apis.actions]]
//! handler = "log"
//! include_paths = ["*"]
//! order = 10
//!
//! [[apis.endpoints]]
//! name = "books"
//! methods = ["GET", "POST"]
//! path = "source/*"
//! config = { maxRows = "100" }
//!
//! [[apis.endpoints.actions]]
//! handler = "sql"
//! config = { table = "books" }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One Api and everything routed beneath it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ApiDefinition {
    /// First path segment selecting this Api. `None` for a lone unnamed Api.
    #[serde(default)]
    pub name: Option<String>,

    /// Segment that must follow the name.
    #[serde(default)]
    pub version: Option<String>,

    /// Whether the next segment names a tenant.
    #[serde(default)]
    pub multi_tenant: bool,

    /// Actions shared by every endpoint without private actions.
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,

    /// Endpoints in match order.
    #[serde(default)]
    pub endpoints: Vec<EndpointDefinition>,
}

/// An endpoint within an Api.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct EndpointDefinition {
    /// Endpoint name.
    pub name: String,

    /// Path pattern relative to the Api. Defaults to `*`.
    #[serde(default)]
    pub path: Option<String>,

    /// Allowed methods. Empty allows any.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Paths to accept. Empty accepts any.
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Paths to reject.
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Sort key, ascending.
    #[serde(default)]
    pub order: Option<i32>,

    /// Key/value configuration visible through the chain.
    #[serde(default)]
    pub config: IndexMap<String, String>,

    /// Private actions. When present the Api-wide actions are not used.
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

/// A handler binding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ActionDefinition {
    /// Registry key of the handler.
    pub handler: String,

    /// Binding name. Defaults to the handler name.
    #[serde(default)]
    pub name: Option<String>,

    /// Allowed methods. Empty allows any.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Paths to accept. Empty accepts any.
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Paths to reject.
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Sort key, ascending.
    #[serde(default)]
    pub order: Option<i32>,

    /// Key/value configuration visible through the chain.
    #[serde(default)]
    pub config: IndexMap<String, String>,
}

impl ActionDefinition {
    /// Name the binding is traced and logged under.
    pub fn binding_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.handler)
    }
}

fn validate_methods(methods: &[String], field: &str) -> Result<(), ConfigError> {
    for method in methods {
        if method.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                format!("{field}.methods"),
                "empty method name",
            ));
        }
        if http::Method::from_bytes(method.trim().as_bytes()).is_err() {
            return Err(ConfigError::invalid_value(
                format!("{field}.methods"),
                format!("'{method}' is not a valid method token"),
            ));
        }
    }
    Ok(())
}

impl ActionDefinition {
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.handler.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                format!("{field}.handler"),
                "handler name is required",
            ));
        }
        validate_methods(&self.methods, field)
    }
}

impl EndpointDefinition {
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                format!("{field}.name"),
                "endpoint name is required",
            ));
        }
        validate_methods(&self.methods, field)?;
        for (i, action) in self.actions.iter().enumerate() {
            action.validate(&format!("{field}.actions[{i}]"))?;
        }
        Ok(())
    }
}

/// Checks every Api definition and the uniqueness of `(name, version)`.
pub(crate) fn validate_apis(apis: &[ApiDefinition]) -> Result<(), ConfigError> {
    for (i, api) in apis.iter().enumerate() {
        let field = format!("apis[{i}]");

        let duplicate = apis[..i].iter().any(|earlier| {
            same_name(earlier.name.as_deref(), api.name.as_deref()) && earlier.version == api.version
        });
        if duplicate {
            return Err(ConfigError::validation_error(format!(
                "{field}: duplicate Api '{}' version '{}'",
                api.name.as_deref().unwrap_or(""),
                api.version.as_deref().unwrap_or("")
            )));
        }

        for (j, action) in api.actions.iter().enumerate() {
            action.validate(&format!("{field}.actions[{j}]"))?;
        }
        for (j, endpoint) in api.endpoints.iter().enumerate() {
            endpoint.validate(&format!("{field}.endpoints[{j}]"))?;
        }
    }

    if apis.len() > 1 && apis.iter().any(|api| api.name.is_none()) {
        return Err(ConfigError::validation_error(
            "an unnamed Api must be the only Api",
        ));
    }

    Ok(())
}

// Api names match case-insensitively at request time.
fn same_name(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(name: &str, version: Option<&str>) -> ApiDefinition {
        ApiDefinition {
            name: Some(name.to_string()),
            version: version.map(str::to_string),
            ..ApiDefinition::default()
        }
    }

    #[test]
    fn test_binding_name_defaults_to_handler() {
        let mut action = ActionDefinition {
            handler: "sql".to_string(),
            ..ActionDefinition::default()
        };
        assert_eq!(action.binding_name(), "sql");
        action.name = Some("books".to_string());
        assert_eq!(action.binding_name(), "books");
    }

    #[test]
    fn test_versions_distinguish_apis() {
        let apis = vec![api("test", Some("v1")), api("test", Some("v2"))];
        assert!(validate_apis(&apis).is_ok());
    }

    #[test]
    fn test_duplicate_api_rejected() {
        let apis = vec![api("Test", Some("v1")), api("test", Some("v1"))];
        let err = validate_apis(&apis).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_unnamed_api_must_be_alone() {
        let apis = vec![ApiDefinition::default(), api("shop", None)];
        assert!(validate_apis(&apis).is_err());
        assert!(validate_apis(&[ApiDefinition::default()]).is_ok());
    }

    #[test]
    fn test_missing_handler_rejected() {
        let mut def = api("shop", None);
        def.actions.push(ActionDefinition::default());
        let err = validate_apis(&[def]).unwrap_err();
        assert!(err.to_string().contains("apis[0].actions[0].handler"));
    }

    #[test]
    fn test_bad_method_rejected() {
        let mut def = api("shop", None);
        def.endpoints.push(EndpointDefinition {
            name: "books".to_string(),
            methods: vec!["GET".to_string(), "BAD METHOD".to_string()],
            ..EndpointDefinition::default()
        });
        let err = validate_apis(&[def]).unwrap_err();
        assert!(err.to_string().contains("apis[0].endpoints[0].methods"));
    }
}
