//! Integration tests for credwatch-common library.

use serde::Deserialize;
use credwatch_common::{Error, LogFormat, LoggingConfig, load_config, parse_config};

#[derive(Debug, Deserialize)]
struct ComponentConfig {
    #[serde(default)]
    logging: LoggingConfig,
    name: String,
    #[serde(default)]
    retries: u32,
}

#[test]
fn test_component_config_from_json5_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("component.json5");
    std::fs::write(
        &path,
        r#"
        // comments and trailing commas are accepted
        {
            name: "basicauth",
            retries: 3,
            logging: { level: "debug", format: "json", },
        }
        "#,
    )
    .expect("write config");

    let config: ComponentConfig = load_config(&path).expect("load config");
    assert_eq!(config.name, "basicauth");
    assert_eq!(config.retries, 3);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_missing_required_field_is_reported() {
    let result: Result<ComponentConfig, Error> = parse_config("{ retries: 1 }");
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("name"), "unexpected message: {msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::Config("bad value".to_string());
    assert_eq!(err.to_string(), "Configuration error: bad value");

    let err = Error::Logging("subscriber already set".to_string());
    assert_eq!(err.to_string(), "Logging setup error: subscriber already set");
}
