//! Configuration loading and validation.

use std::io::Write;

use fxpeer::config::Config;
use fxpeer::error::{ConfigError, Error};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn loads_a_complete_config() {
    let file = write_config(
        r#"
        [api]
        base_url = "https://backend.example.com"
        auth_token = "secret"
        user_id = "u-1"

        [sync]
        poll_interval_ms = 5000
        failure_threshold = 5

        [logging]
        level = "debug"
        format = "json"
        "#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.api.base_url, "https://backend.example.com");
    assert_eq!(config.api.user_id.as_deref(), Some("u-1"));
    assert_eq!(config.sync.poll_interval_ms, 5000);
    assert_eq!(config.sync.failure_threshold, 5);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn partial_config_falls_back_to_defaults() {
    let file = write_config(
        r#"
        [api]
        base_url = "https://backend.example.com"
        "#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.sync.poll_interval_ms, 6_000);
    assert_eq!(config.sync.failure_threshold, 3);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn missing_file_is_a_read_error() {
    let err = Config::load("/nonexistent/fxpeer.toml").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_config("this is not toml [");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}

#[test]
fn invalid_base_url_fails_validation() {
    let file = write_config(
        r#"
        [api]
        base_url = "not a url"
        "#,
    );
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue { field: "api.base_url", .. })
    ));
}

#[test]
fn zero_poll_interval_fails_validation() {
    let file = write_config(
        r#"
        [sync]
        poll_interval_ms = 0
        "#,
    );
    assert!(Config::load(file.path()).is_err());
}
