//! Validate config command implementation
//!
//! Loads and validates the configuration file and prints a summary.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::ClientConfig;
use crate::domain::Result;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(
        &self,
        config_path: &str,
        config: Result<ClientConfig>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match config {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Service Host: {}", config.i2b2.service_host_url);
        println!("  Proxy URL: {}", config.i2b2.proxy_url);
        println!("  Timeout: {}s", config.i2b2.timeout_seconds);
        println!("  Max Attempts: {}", config.i2b2.retry.max_attempts);
        println!("  TLS Verify: {}", config.i2b2.tls_verify);
        match config.auth {
            Some(ref auth) => {
                println!("  Domain: {}", auth.domain);
                println!("  Username: {}", auth.username);
                println!("  Project: {}", auth.project_id);
            }
            None => println!("  Credentials: not configured (retrieve will fail)"),
        }
        if config.logging.local_enabled {
            println!(
                "  File Logging: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();

        Ok(EXIT_OK)
    }
}
