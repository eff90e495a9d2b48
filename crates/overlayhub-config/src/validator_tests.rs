use super::*;
use serde_json::json;

fn remote(provider: &str) -> Config {
    let mut config = Config::default();
    config.analysis.provider = provider.to_string();
    config.analysis.endpoint = Some("https://api.example.com/v1".to_string());
    config.analysis.api_key = Some("sk-test".to_string());
    config
}

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_server() {
    let mut config = Config::default();
    config.server.port = 0;
    config.server.host = String::new();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
    assert!(result.errors.iter().any(|e| e.path == "server.host"));
}

#[test]
fn test_validate_unknown_provider() {
    let mut config = Config::default();
    config.analysis.provider = "gpt".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    let error = result
        .errors
        .iter()
        .find(|e| e.path == "analysis.provider")
        .unwrap();
    assert!(error.message.contains("gpt"));
}

#[test]
fn test_validate_remote_provider_requirements() {
    assert!(ConfigValidator::validate(&remote("remote-a")).is_valid());

    let mut config = remote("remote-b");
    config.analysis.endpoint = None;
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "analysis.endpoint"));

    let mut config = remote("remote-a");
    config.analysis.endpoint = Some("api.example.com".to_string());
    assert!(!ConfigValidator::validate(&config).is_valid());

    let mut config = remote("remote-a");
    config.analysis.api_key = None;
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "analysis.api_key"));
}

#[test]
fn test_validate_history_bounds() {
    let mut config = Config::default();
    config.history.retain = 1000;
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "history.retain"));
}

#[test]
fn test_validate_storage() {
    let mut config = Config::default();
    config.storage.backend = "file".to_string();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "storage.path"));

    config.storage.backend = "redis".to_string();
    assert!(!ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_validate_extension_conflict() {
    let mut config = Config::default();
    config.extensions.enabled.push("analytics".to_string());
    config.extensions.disabled.push("analytics".to_string());
    assert!(!ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_validate_extension_config_shape() {
    let mut config = Config::default();
    config
        .extensions
        .config
        .insert("analytics".to_string(), json!("on"));
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "extensions.config.analytics"));
}

#[test]
fn test_validation_error_new() {
    let err = ValidationError::new("server.port", "must be positive");
    assert_eq!(err.path, "server.port");
    assert_eq!(err.message, "must be positive");
}
