//! Configuration loading from files and the environment

use crate::assert_err;
use lexdraft::editor::NodeType;
use lexdraft::shared::config::{ENV_API_BASE_URL, ENV_REQUEST_TIMEOUT_SECS};
use lexdraft::shared::{AppConfig, ConfigError, DocumentId};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;

fn clear_env() {
    std::env::remove_var(ENV_API_BASE_URL);
    std::env::remove_var(ENV_REQUEST_TIMEOUT_SECS);
}

#[test]
fn test_load_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        api_base_url = "https://drafts.example.com/api/"
        request_timeout_secs = 30
        indentable_types = ["paragraph", "heading", "listItem"]

        [retry]
        max_retries = 1
        jitter_ms = 0
        "#
    )
    .unwrap();

    let config = AppConfig::load_file(file.path()).unwrap();
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.retry.max_retries, 1);
    assert_eq!(
        config.indentable_types,
        vec![NodeType::Paragraph, NodeType::Heading, NodeType::ListItem]
    );
    assert_eq!(
        config
            .websocket_url(&DocumentId::parse("abc").unwrap())
            .unwrap(),
        "wss://drafts.example.com/ws/document/abc/"
    );
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = AppConfig::load_file(&dir.path().join("absent.toml"));
    assert_err!(result, ConfigError::Io(_));
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var(ENV_API_BASE_URL, "https://legal.example.org/API");
    std::env::set_var(ENV_REQUEST_TIMEOUT_SECS, " 15 ");

    let mut config = AppConfig::default();
    config.apply_env_overrides().unwrap();
    clear_env();

    assert_eq!(config.api_base_url, "https://legal.example.org/API");
    assert_eq!(config.request_timeout_secs, 15);
    assert_eq!(
        config
            .websocket_url(&DocumentId::parse("d9").unwrap())
            .unwrap(),
        "wss://legal.example.org/ws/document/d9/"
    );
}

#[test]
#[serial]
fn test_env_override_rejects_bad_timeout() {
    clear_env();
    std::env::set_var(ENV_REQUEST_TIMEOUT_SECS, "soon");

    let mut config = AppConfig::default();
    let result = config.apply_env_overrides();
    clear_env();

    assert_err!(
        result,
        ConfigError::InvalidValue {
            key: "request_timeout_secs",
            ..
        }
    );
}

#[test]
#[serial]
fn test_blank_env_url_is_ignored() {
    clear_env();
    std::env::set_var(ENV_API_BASE_URL, "   ");

    let mut config = AppConfig::default();
    config.apply_env_overrides().unwrap();
    clear_env();

    assert_eq!(config, AppConfig::default());
}
