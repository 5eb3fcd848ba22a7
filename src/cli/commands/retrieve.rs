//! Retrieve command implementation
//!
//! Runs one PDO retrieval with the credentials from the configuration file
//! and writes the results as JSON.

use super::{auth_from_config, RequestArgs, EXIT_CONFIG, EXIT_OK, EXIT_REQUEST};
use crate::adapters::HttpXmlPostSupport;
use crate::config::ClientConfig;
use crate::core::PdoRetriever;
use crate::domain::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the retrieve command
#[derive(Args, Debug)]
pub struct RetrieveArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Write JSON results to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Single-line JSON
    #[arg(long)]
    pub compact: bool,
}

impl RetrieveArgs {
    /// Execute the retrieve command
    pub async fn execute(
        &self,
        config: Result<ClientConfig>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match config {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let auth = match auth_from_config(&config) {
            Ok(auth) => auth,
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let (concepts, patient_set) = match self.request.to_domain() {
            Ok(inputs) => inputs,
            Err(e) => {
                eprintln!("Invalid request: {e}");
                return Ok(EXIT_REQUEST);
            }
        };

        let transport = HttpXmlPostSupport::new(&config.i2b2)?.with_shutdown(shutdown_signal);
        let retriever = PdoRetriever::new(config.i2b2.service_host_url.clone(), Arc::new(transport));

        let results = match retriever.retrieve(&auth, &concepts, &patient_set).await {
            Ok(results) => results,
            Err(e) => {
                crate::log_error_with_context!(&e, "retrieve command failed");
                eprintln!("PDO retrieval failed: {e}");
                if e.is_retryable() {
                    eprintln!("The failure looks transient; retrying later may succeed.");
                }
                return Ok(EXIT_REQUEST);
            }
        };

        let json = if self.compact {
            serde_json::to_string(&results)?
        } else {
            serde_json::to_string_pretty(&results)?
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, json)?;
                eprintln!(
                    "Wrote {} patients and {} observations to {}",
                    results.patients().len(),
                    results.observations().len(),
                    path.display()
                );
            }
            None => println!("{json}"),
        }

        if !results.faults().is_empty() {
            eprintln!(
                "Warning: {} response entries could not be used",
                results.faults().len()
            );
        }

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    fn args() -> RetrieveArgs {
        RetrieveArgs {
            request: RequestArgs {
                concepts: vec!["LAB:GLU".to_string()],
                patient_set: "SET1".to_string(),
                set_size: 50.0,
            },
            output: None,
            compact: false,
        }
    }

    #[tokio::test]
    async fn test_missing_config_is_configuration_error() {
        let (_tx, rx) = watch::channel(false);
        let code = args().execute(load_config("does-not-exist.toml"), rx).await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_config_without_auth_is_configuration_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("i2b2.toml");
        std::fs::write(
            &path,
            r#"
[i2b2]
service_host_url = "http://localhost:9090/i2b2/services"
proxy_url = "http://localhost/webclient/index.php"
"#,
        )
        .unwrap();

        let (_tx, rx) = watch::channel(false);
        let code = args().execute(load_config(&path), rx).await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
