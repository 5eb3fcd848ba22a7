//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ClientConfig;
use crate::config::secret_string;
use crate::domain::errors::I2b2Error;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ClientConfig
/// 4. Applies environment variable overrides (I2B2_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`I2b2Error::Configuration`] if the file cannot be read, a
/// referenced variable is unset, parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use i2b2_pdo::config::load_config;
///
/// let config = load_config("i2b2.toml").expect("Failed to load config");
/// println!("Posting to {}", config.i2b2.proxy_url);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(I2b2Error::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        I2b2Error::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same steps as [`load_config`] without the file access.
pub fn load_config_str(contents: &str) -> Result<ClientConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ClientConfig = toml::from_str(&contents)
        .map_err(|e| I2b2Error::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        I2b2Error::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    tracing::debug!(
        proxy_url = %config.i2b2.proxy_url,
        service_host_url = %config.i2b2.service_host_url,
        "Configuration loaded"
    );

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| I2b2Error::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(I2b2Error::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the I2B2_* prefix
///
/// Variables follow the pattern `I2B2_<SECTION>_<KEY>`, for example
/// `I2B2_SERVICE_PROXY_URL` or `I2B2_AUTH_PASSWORD_NODE`.
fn apply_env_overrides(config: &mut ClientConfig) {
    if let Ok(val) = std::env::var("I2B2_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("I2B2_SERVICE_HOST_URL") {
        config.i2b2.service_host_url = val;
    }
    if let Ok(val) = std::env::var("I2B2_SERVICE_PROXY_URL") {
        config.i2b2.proxy_url = val;
    }
    if let Ok(val) = std::env::var("I2B2_SERVICE_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.i2b2.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("I2B2_SERVICE_TLS_VERIFY") {
        config.i2b2.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("I2B2_SERVICE_RETRY_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.i2b2.retry.max_attempts = attempts;
        }
    }

    // Only overrides an auth section that is present
    if let Some(ref mut auth) = config.auth {
        if let Ok(val) = std::env::var("I2B2_AUTH_DOMAIN") {
            auth.domain = val;
        }
        if let Ok(val) = std::env::var("I2B2_AUTH_USERNAME") {
            auth.username = val;
        }
        if let Ok(val) = std::env::var("I2B2_AUTH_PASSWORD_NODE") {
            auth.password_node = secret_string(val);
        }
        if let Ok(val) = std::env::var("I2B2_AUTH_PROJECT_ID") {
            auth.project_id = val;
        }
    }

    if let Ok(val) = std::env::var("I2B2_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("I2B2_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
