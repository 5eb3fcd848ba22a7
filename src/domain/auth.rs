//! Authentication metadata supplied with every PDO request

use crate::config::{secret_string, SecretString};
use secrecy::ExposeSecret;

/// Credentials placed in the request's `<security>` block
///
/// The password node is the session reference handed out by the i2b2 PM
/// cell, never the user's raw password. It is held as a secret so that it
/// does not leak through `Debug` output or logs.
///
/// # Examples
///
/// ```
/// use i2b2_pdo::domain::AuthMetadata;
///
/// let auth = AuthMetadata::new("EMORY", "jdoe", "tok123", "P1");
/// assert_eq!(auth.domain(), "EMORY");
/// assert!(!format!("{auth:?}").contains("tok123"));
/// ```
#[derive(Debug, Clone)]
pub struct AuthMetadata {
    domain: String,
    username: String,
    password_node: SecretString,
    project_id: String,
}

impl AuthMetadata {
    /// Creates authentication metadata
    pub fn new(
        domain: impl Into<String>,
        username: impl Into<String>,
        password_node: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            username: username.into(),
            password_node: secret_string(password_node.into()),
            project_id: project_id.into(),
        }
    }

    /// Creates authentication metadata from an already protected password node
    pub fn with_secret(
        domain: impl Into<String>,
        username: impl Into<String>,
        password_node: SecretString,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            username: username.into(),
            password_node,
            project_id: project_id.into(),
        }
    }

    /// The i2b2 domain
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The i2b2 user name
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The opaque password reference
    pub fn password_node(&self) -> &SecretString {
        &self.password_node
    }

    /// Exposes the password reference for rendering
    pub(crate) fn expose_password_node(&self) -> &str {
        self.password_node.expose_secret().as_ref()
    }

    /// The i2b2 project the request runs under
    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}
