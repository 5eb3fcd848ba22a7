//! Configuration management for the PDO client.
//!
//! TOML configuration with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `I2B2_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! Configuration is loaded once, before the retriever is built, and is
//! read-only afterward.
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [i2b2]
//! service_host_url = "http://i2b2.example.org:9090/i2b2/services"
//! proxy_url = "https://i2b2.example.org/webclient/index.php"
//! timeout_seconds = 180
//!
//! [i2b2.retry]
//! max_attempts = 3
//!
//! [auth]
//! domain = "i2b2demo"
//! username = "demo"
//! password_node = "${I2B2_PASSWORD_NODE}"
//! project_id = "Demo"
//!
//! [logging]
//! local_enabled = true
//! local_path = "/var/log/i2b2-pdo"
//! ```
//!
//! # Loading
//!
//! ```rust,no_run
//! use i2b2_pdo::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("i2b2.toml")?;
//! println!("Proxy URL: {}", config.i2b2.proxy_url);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, AuthConfig, ClientConfig, Environment, LoggingConfig, RetryConfig,
    ServiceConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
