//! File and environment layers of the config loader.

use std::io::Write;

use tempfile::NamedTempFile;
use waypoint_config::{ConfigError, ConfigLoader, LogFormat};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const ROUTES: &str = r#"
[engine]
servlet_mapping = "rest/*"
error_bodies = false

[telemetry]
service_name = "northwind"

[telemetry.logging]
level = "waypoint_core=debug,info"
format = "compact"

[[apis]]
name = "northwind"
version = "v1"
multi_tenant = true

[[apis.actions]]
handler = "audit"
include_paths = ["*"]
order = 10

[[apis.endpoints]]
name = "source"
methods = ["GET", "post"]
path = "source/*"
exclude_paths = ["source/secrets/*"]
config = { maxRows = "100", table = "orders" }

[[apis.endpoints.actions]]
handler = "sql"
name = "orders"
order = 500
config = { table = "orders_v1" }
"#;

#[test]
fn test_toml_file_roundtrips_route_definitions() {
    let file = temp_file(".toml", ROUTES);
    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.engine.servlet_mapping.as_deref(), Some("rest/*"));
    assert!(!config.engine.error_bodies);
    assert!(config.engine.debug);
    assert_eq!(config.telemetry.service_name, "northwind");
    assert_eq!(config.telemetry.logging.format, LogFormat::Compact);

    let api = &config.apis[0];
    assert_eq!(api.version.as_deref(), Some("v1"));
    assert!(api.multi_tenant);
    assert_eq!(api.actions[0].handler, "audit");
    assert_eq!(api.actions[0].order, Some(10));

    let endpoint = &api.endpoints[0];
    assert_eq!(endpoint.methods, vec!["GET", "post"]);
    assert_eq!(endpoint.exclude_paths, vec!["source/secrets/*"]);
    let keys: Vec<&str> = endpoint.config.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["maxRows", "table"]);

    let action = &endpoint.actions[0];
    assert_eq!(action.binding_name(), "orders");
    assert_eq!(action.config["table"], "orders_v1");
}

#[test]
fn test_json_file_by_extension() {
    let file = temp_file(
        ".json",
        r#"{"apis": [{"name": "shop", "endpoints": [{"name": "books", "path": "books/*"}]}]}"#,
    );
    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert_eq!(config.apis[0].endpoints[0].path.as_deref(), Some("books/*"));
}

#[test]
fn test_unknown_extension_rejected() {
    let file = temp_file(".yaml", "engine: {}");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_unknown_field_in_file_rejected() {
    let file = temp_file(".toml", "[[apis]]\nname = \"shop\"\ntenants = true\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_missing_handler_fails_validation() {
    let file = temp_file(
        ".toml",
        "[[apis]]\nname = \"shop\"\n\n[[apis.actions]]\nhandler = \"\"\n",
    );
    let result = ConfigLoader::new().with_file(file.path()).unwrap().load();
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_dotenv_file_feeds_env_overrides() {
    let env = temp_file(
        ".env",
        "WPTEST_DOTENV__ENGINE__ERROR_BODIES=false\nWPTEST_DOTENV__TELEMETRY__LOGGING__LEVEL=warn\n",
    );
    let config = ConfigLoader::new()
        .with_dotenv_file(env.path())
        .unwrap()
        .with_env_prefix("wptest_dotenv")
        .load()
        .unwrap();

    assert!(!config.engine.error_bodies);
    assert_eq!(config.telemetry.logging.level, "warn");
}

#[test]
fn test_env_overrides_apply_after_file() {
    let file = temp_file(".toml", ROUTES);
    let env = temp_file(".env", "WPTEST_LAYERS__ENGINE__SERVLET_MAPPING=api/*\n");

    let config = ConfigLoader::new()
        .with_file(file.path())
        .unwrap()
        .with_dotenv_file(env.path())
        .unwrap()
        .with_env_prefix("WPTEST_LAYERS")
        .load()
        .unwrap();

    assert_eq!(config.engine.servlet_mapping.as_deref(), Some("api/*"));
    assert_eq!(config.apis.len(), 1);
}
