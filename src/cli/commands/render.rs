//! Render-request command implementation
//!
//! Prints the request document `retrieve` would send, without sending it.
//! The password node is replaced by a placeholder unless `--show-secret`
//! is given.

use super::{auth_from_config, RequestArgs, EXIT_CONFIG, EXIT_OK, EXIT_REQUEST};
use crate::adapters::random_message_id;
use crate::config::ClientConfig;
use crate::core::render_pdo_request;
use crate::domain::{AuthMetadata, Result};
use crate::request::PDO_REQUEST_TEMPLATE;
use clap::Args;

const REDACTED_PASSWORD: &str = "********";

/// Arguments for the render-request command
#[derive(Args, Debug)]
pub struct RenderRequestArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Message id to embed (random when omitted)
    #[arg(long, value_name = "ID")]
    pub message_id: Option<String>,

    /// Include the real password node
    #[arg(long)]
    pub show_secret: bool,
}

impl RenderRequestArgs {
    /// Execute the render-request command
    pub async fn execute(&self, config: Result<ClientConfig>) -> anyhow::Result<i32> {
        let config = match config {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let auth = match auth_from_config(&config) {
            Ok(auth) if self.show_secret => auth,
            Ok(auth) => AuthMetadata::new(
                auth.domain(),
                auth.username(),
                REDACTED_PASSWORD,
                auth.project_id(),
            ),
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

        let message_id = self.message_id.clone().unwrap_or_else(random_message_id);
        match render_pdo_request(
            &config.i2b2.service_host_url,
            &auth,
            &concepts,
            &patient_set,
            &message_id,
        ) {
            Ok(xml) => {
                tracing::debug!(template = PDO_REQUEST_TEMPLATE, "Rendered request");
                println!("{xml}");
                Ok(EXIT_OK)
            }
            Err(e) => {
                eprintln!("Failed to render request: {e}");
                Ok(EXIT_REQUEST)
            }
        }
    }
}
