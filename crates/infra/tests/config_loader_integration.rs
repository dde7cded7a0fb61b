//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use emo_domain::{EmoPlatformError, Plan};
use emo_infra::config;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "endpoint_url": "https://platform-api.example.com",
        "token_dir": "/tmp/emo-tokens",
        "plan": "biz_advanced",
        "api_key": "channel-key",
        "timeout_secs": 15,
        "webhook": {
            "host": "0.0.0.0",
            "port": 8100,
            "poll_interval_secs": 5
        }
    }"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let config = config::load_from_file(Some(path.clone())).expect("Failed to load JSON config");

    assert_eq!(config.endpoint_url, "https://platform-api.example.com");
    assert_eq!(config.token_dir.to_string_lossy(), "/tmp/emo-tokens");
    assert_eq!(config.plan, Plan::BizAdvanced);
    assert_eq!(config.api_key.as_deref(), Some("channel-key"));
    assert_eq!(config.timeout_secs, 15);
    assert_eq!(config.webhook.host, "0.0.0.0");
    assert_eq!(config.webhook.port, 8100);
    assert_eq!(config.webhook.poll_interval_secs, 5);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("emo-platform.toml");
    std::fs::write(
        &path,
        r#"
            plan = "personal"
            use_cached_credentials = true

            [webhook]
            port = 9000
        "#,
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("Failed to load TOML config");

    assert_eq!(config.plan, Plan::Personal);
    assert!(config.use_cached_credentials);
    assert_eq!(config.webhook.port, 9000);
    assert_eq!(config.webhook.host, "localhost");
    assert_eq!(config.endpoint_url, "https://platform-api.bocco.me");
}

#[test]
fn test_load_config_with_minimal_fields() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{}").expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("Empty config should load");
    assert_eq!(config, emo_domain::PlatformConfig::default());
}

#[test]
fn test_business_plan_without_key_fails_validation() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("emo-platform.toml");
    std::fs::write(&path, "plan = \"biz_basic\"\n").expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("File itself is well formed");
    let err = config::validate(&config).unwrap_err();
    assert!(matches!(err, EmoPlatformError::Config(_)));
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/emo-platform.toml".into()));
    assert!(matches!(result, Err(EmoPlatformError::Config(_))));
}

#[test]
fn test_load_config_with_invalid_format() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("emo-platform.toml");
    std::fs::write(&path, "plan = [unclosed").expect("Failed to write config");

    let err = config::load_from_file(Some(path)).unwrap_err();
    assert!(matches!(err, EmoPlatformError::Config(ref m) if m.contains("TOML")));
}
