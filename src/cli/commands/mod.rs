//! CLI command implementations
//!
//! `retrieve` and `render-request` share the [`RequestArgs`] inputs.

pub mod render;
pub mod retrieve;
pub mod validate;

use crate::config::ClientConfig;
use crate::domain::{AuthMetadata, Concept, PatientSet};
use clap::Args;

/// Exit code for a successful command
pub const EXIT_OK: i32 = 0;

/// Exit code for configuration problems
pub const EXIT_CONFIG: i32 = 2;

/// Exit code for a failed PDO request
pub const EXIT_REQUEST: i32 = 3;

/// Request inputs common to `retrieve` and `render-request`
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Concept key to request (repeatable)
    #[arg(short = 'k', long = "concept", value_name = "KEY", required = true)]
    pub concepts: Vec<String>,

    /// Patient set collection id
    #[arg(short, long, value_name = "ID")]
    pub patient_set: String,

    /// Maximum number of patients to return
    #[arg(short, long, value_name = "N")]
    pub set_size: f64,
}

impl RequestArgs {
    /// Converts the raw arguments into domain inputs
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid argument
    pub fn to_domain(&self) -> Result<(Vec<Concept>, PatientSet), String> {
        let concepts = self
            .concepts
            .iter()
            .map(|key| Concept::new(key.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let patient_set = PatientSet::new(self.patient_set.as_str(), self.set_size)?;
        Ok((concepts, patient_set))
    }
}

/// Credentials from the `[auth]` section
pub(crate) fn auth_from_config(config: &ClientConfig) -> Result<AuthMetadata, String> {
    config
        .auth
        .as_ref()
        .map(|auth| auth.to_auth_metadata())
        .ok_or_else(|| "configuration has no [auth] section".to_string())
}
