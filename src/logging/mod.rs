//! Logging and observability
//!
//! Structured logging with:
//! - Console output with `EnvFilter` levels
//! - Optional JSON file output with rotation
//!
//! The password node never reaches a log line; it is a `secrecy` secret.
//!
//! # Example
//!
//! ```no_run
//! use i2b2_pdo::logging::init_logging;
//! use i2b2_pdo::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(project_id = "P1", "Retrieving PDO");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a PDO retrieval
///
/// # Example
///
/// ```no_run
/// use i2b2_pdo::log_retrieval_start;
///
/// log_retrieval_start!("SET1", 3);
/// ```
#[macro_export]
macro_rules! log_retrieval_start {
    ($patient_set:expr, $concept_count:expr) => {
        tracing::info!(
            patient_set = %$patient_set,
            concept_count = $concept_count,
            "Starting PDO retrieval"
        );
    };
}

/// Log the completion of a PDO retrieval
///
/// # Example
///
/// ```no_run
/// use i2b2_pdo::log_retrieval_complete;
/// use std::time::Duration;
///
/// log_retrieval_complete!(12, 340, 0, Duration::from_millis(850));
/// ```
#[macro_export]
macro_rules! log_retrieval_complete {
    ($patients:expr, $observations:expr, $faults:expr, $duration:expr) => {
        tracing::info!(
            patient_count = $patients,
            observation_count = $observations,
            fault_count = $faults,
            duration_ms = $duration.as_millis() as u64,
            "PDO retrieval completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use i2b2_pdo::log_error_with_context;
/// use i2b2_pdo::domain::I2b2Error;
///
/// let error = I2b2Error::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use i2b2_pdo::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, 2000, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying request after error"
        );
    };
}
