//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use scheduleprep_infra::config;
use tempfile::tempdir;

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "persistence": {
            "graphql_url": "http://hasura:8080/v1/graphql",
            "admin_secret": "hasura-secret"
        },
        "object_store": {
            "endpoint": "http://minio:8484",
            "bucket": "planner-inputs",
            "access_key_id": "minio",
            "secret_access_key": "minio-secret"
        },
        "solver": {
            "base_url": "http://solver:8081",
            "username": "admin",
            "password": "solver-pw",
            "callback_url": "http://functions/on-solved"
        }
    }"#;

    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("scheduleprep.json");
    std::fs::write(&path, json_content).expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("Failed to load config from JSON file");

    assert_eq!(config.persistence.admin_secret, "hasura-secret");
    assert_eq!(config.object_store.region, "us-east-1");
    assert_eq!(config.solver.delay_ms, 300_000);
    assert_eq!(config.http.max_attempts, 3);
    assert_eq!(config.logging.filter, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[persistence]
graphql_url = "http://hasura:8080/v1/graphql"
admin_secret = "hasura-secret"

[object_store]
endpoint = "http://minio:8484"
bucket = "planner-inputs"
region = "eu-west-1"
access_key_id = "minio"
secret_access_key = "minio-secret"

[solver]
base_url = "http://solver:8081"
username = "admin"
password = "solver-pw"
callback_url = "http://functions/on-solved"
delay_ms = 0

[http]
timeout_secs = 10
max_attempts = 5
base_backoff_ms = 100

[logging]
filter = "scheduleprep=debug"
json = true
"#;

    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, toml_content).expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("Failed to load config from TOML file");

    assert_eq!(config.object_store.region, "eu-west-1");
    assert_eq!(config.solver.delay_ms, 0);
    assert_eq!(config.http.timeout_secs, 10);
    assert_eq!(config.http.max_attempts, 5);
    assert_eq!(config.logging.filter, "scheduleprep=debug");
    assert!(config.logging.json);
}

#[test]
fn test_empty_secret_fails_validation() {
    let toml_content = r#"
[persistence]
graphql_url = "http://hasura:8080/v1/graphql"
admin_secret = ""

[object_store]
endpoint = "http://minio:8484"
bucket = "planner-inputs"
access_key_id = "minio"
secret_access_key = "minio-secret"

[solver]
base_url = "http://solver:8081"
username = "admin"
password = "solver-pw"
callback_url = "http://functions/on-solved"
"#;

    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, toml_content).expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("parses");
    let err = config.validate().unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("persistence.admin_secret"));
}

#[test]
fn test_malformed_json_is_a_config_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").expect("Failed to write config");

    let err = config::load_from_file(Some(path)).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("Invalid JSON"));
}
