//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX` to avoid
//! interfering with each other.

use i2b2_pdo::config::{load_config, Environment};
use i2b2_pdo::core::PdoRetriever;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "I2B2_APPLICATION_LOG_LEVEL",
        "I2B2_SERVICE_HOST_URL",
        "I2B2_SERVICE_PROXY_URL",
        "I2B2_SERVICE_TIMEOUT_SECONDS",
        "I2B2_SERVICE_TLS_VERIFY",
        "I2B2_SERVICE_RETRY_MAX_ATTEMPTS",
        "I2B2_AUTH_DOMAIN",
        "I2B2_AUTH_USERNAME",
        "I2B2_AUTH_PASSWORD_NODE",
        "I2B2_AUTH_PROJECT_ID",
        "I2B2_LOGGING_LOCAL_ENABLED",
        "I2B2_LOGGING_LOCAL_PATH",
        "TEST_I2B2_PASSWORD_NODE",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const COMPLETE_CONFIG: &str = r#"
environment = "staging"

[application]
log_level = "debug"

[i2b2]
service_host_url = "http://i2b2.example.org:9090/i2b2/services"
proxy_url = "https://i2b2.example.org/webclient/index.php"
timeout_seconds = 60
tls_verify = true

[i2b2.retry]
max_attempts = 4
initial_delay_ms = 500
max_delay_ms = 8000
backoff_multiplier = 3.0

[auth]
domain = "EMORY"
username = "jdoe"
password_node = "tok123"
project_id = "P1"

[logging]
local_enabled = true
local_path = "/var/log/i2b2-pdo"
local_rotation = "hourly"
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(COMPLETE_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.i2b2.timeout_seconds, 60);
    assert_eq!(config.i2b2.retry.max_attempts, 4);
    assert_eq!(config.i2b2.retry.backoff_multiplier, 3.0);
    assert_eq!(config.logging.local_rotation, "hourly");

    let auth = config.auth.as_ref().unwrap();
    assert_eq!(auth.domain, "EMORY");
    assert_eq!(auth.password_node.expose_secret(), "tok123");

    // password node must not leak through Debug
    assert!(!format!("{config:?}").contains("tok123"));
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_I2B2_PASSWORD_NODE", "SessionKey:abc123");

    let file = write_config(
        r#"
[i2b2]
service_host_url = "http://localhost:9090/i2b2/services"
proxy_url = "http://localhost/webclient/index.php"

[auth]
domain = "i2b2demo"
username = "demo"
password_node = "${TEST_I2B2_PASSWORD_NODE}"
project_id = "Demo"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.auth.unwrap().password_node.expose_secret(),
        "SessionKey:abc123"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[i2b2]
service_host_url = "http://localhost:9090/i2b2/services"
proxy_url = "http://localhost/webclient/index.php"

[auth]
domain = "i2b2demo"
username = "demo"
password_node = "${TEST_I2B2_PASSWORD_NODE}"
project_id = "Demo"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_I2B2_PASSWORD_NODE"));
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("I2B2_SERVICE_PROXY_URL", "https://override.example.org/proxy");
    std::env::set_var("I2B2_SERVICE_RETRY_MAX_ATTEMPTS", "1");
    std::env::set_var("I2B2_AUTH_PROJECT_ID", "P2");

    let file = write_config(COMPLETE_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.i2b2.proxy_url, "https://override.example.org/proxy");
    assert_eq!(config.i2b2.retry.max_attempts, 1);
    assert_eq!(config.auth.unwrap().project_id, "P2");

    cleanup_env_vars();
}

#[test]
fn test_production_requires_tls_verification() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
environment = "production"

[i2b2]
service_host_url = "https://i2b2.example.org/i2b2/services"
proxy_url = "https://i2b2.example.org/webclient/index.php"
tls_verify = false
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TLS"));
}

#[test]
fn test_invalid_toml() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[i2b2\nservice_host_url = ");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}

#[test]
fn test_missing_i2b2_section() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[application]\nlog_level = \"info\"\n");
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_retriever_from_loaded_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(COMPLETE_CONFIG);
    let config = load_config(file.path()).unwrap();

    let retriever = PdoRetriever::from_config(&config.i2b2).unwrap();
    assert_eq!(
        retriever.service_host_url(),
        "http://i2b2.example.org:9090/i2b2/services"
    );
}
