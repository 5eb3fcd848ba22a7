//! CLI interface and argument parsing
//!
//! This module provides the `i2b2-pdo` command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// i2b2 PDO client
#[derive(Parser, Debug)]
#[command(name = "i2b2-pdo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "i2b2.toml", env = "I2B2_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "I2B2_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve patient data for a patient set and print it as JSON
    Retrieve(commands::retrieve::RetrieveArgs),

    /// Print the PDO request document without sending it
    RenderRequest(commands::render::RenderRequestArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_retrieve() {
        let cli = Cli::parse_from([
            "i2b2-pdo",
            "retrieve",
            "--concept",
            "LAB:GLU",
            "--concept",
            "LAB:NA",
            "--patient-set",
            "SET1",
            "--set-size",
            "50",
        ]);
        assert_eq!(cli.config, "i2b2.toml");
        match cli.command {
            Commands::Retrieve(args) => {
                assert_eq!(args.request.concepts, vec!["LAB:GLU", "LAB:NA"]);
                assert_eq!(args.request.patient_set, "SET1");
                assert_eq!(args.request.set_size, 50.0);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_retrieve_requires_concept() {
        let result = Cli::try_parse_from([
            "i2b2-pdo",
            "retrieve",
            "--patient-set",
            "SET1",
            "--set-size",
            "50",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "i2b2-pdo",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
            "validate-config",
        ]);
        assert_eq!(cli.config, "custom.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_render_request() {
        let cli = Cli::parse_from([
            "i2b2-pdo",
            "render-request",
            "-k",
            "LAB:GLU",
            "-p",
            "SET1",
            "-s",
            "10",
            "--message-id",
            "MSG-1",
        ]);
        match cli.command {
            Commands::RenderRequest(args) => {
                assert_eq!(args.message_id.as_deref(), Some("MSG-1"));
                assert!(!args.show_secret);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
