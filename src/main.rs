// i2b2 PDO Client - Patient Data Object retrieval for i2b2 hives
// Copyright (c) 2025 i2b2-pdo Contributors
// Licensed under the MIT License

use clap::Parser;
use i2b2_pdo::cli::{Cli, Commands};
use i2b2_pdo::config::{load_config, ClientConfig, LoggingConfig};
use i2b2_pdo::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Loaded once; logging settings come from it when it loads and the
    // command reports load failures
    let config = load_config(&cli.config);
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().ok().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::console_only());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "i2b2 PDO client");
    match &config {
        Ok(c) => tracing::debug!(
            config_path = %cli.config,
            proxy_url = %c.i2b2.proxy_url,
            service_host_url = %c.i2b2.service_host_url,
            "Configuration loaded"
        ),
        Err(e) => tracing::debug!(config_path = %cli.config, error = %e, "Configuration not loaded"),
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), cancelling request");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, cancelling request");
                }
            }
            let _ = shutdown_tx.send(true);
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), cancelling request");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let exit_code = match execute_command(&cli, config, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // Flush file logs before exiting
    drop(guard);
    process::exit(exit_code);
}

async fn execute_command(
    cli: &Cli,
    config: i2b2_pdo::domain::Result<ClientConfig>,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Retrieve(args) => args.execute(config, shutdown_signal).await,
        Commands::RenderRequest(args) => args.execute(config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config, config).await,
    }
}
