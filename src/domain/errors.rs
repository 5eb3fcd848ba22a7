//! Domain error types
//!
//! This module defines the error hierarchy for the PDO client. Each layer has
//! its own error enum; the retriever collapses all of them into [`I2b2Error`]
//! while keeping the layer error available through `source()`.
//! Errors don't expose third-party types.

use thiserror::Error;

/// Main client error type
///
/// This is the single failure type callers of the retriever handle. The
/// variant records which layer failed and wraps that layer's error.
#[derive(Debug, Error)]
pub enum I2b2Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request rendering failed
    #[error("Request template error: {0}")]
    Template(#[from] TemplateError),

    /// Network call or response body failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response was well-formed XML but not a usable PDO response
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl I2b2Error {
    /// Whether repeating the same call could succeed
    ///
    /// Only transient transport faults are retryable. Template and protocol
    /// errors indicate a packaging defect or a service-side rejection.
    pub fn is_retryable(&self) -> bool {
        match self {
            I2b2Error::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Request rendering errors
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A required request field was absent or empty
    #[error("Missing required request field: {0}")]
    MissingField(&'static str),

    /// The password node could not be turned into a `<password>` element
    #[error("Invalid password node: {0}")]
    InvalidPasswordNode(String),

    /// A numeric field could not be rendered
    #[error("Invalid numeric value for {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    /// The XML writer failed
    #[error("Failed to write request XML: {0}")]
    Write(String),
}

/// Transport collaborator errors
///
/// Produced by [`crate::adapters::XmlPostSupport`] implementations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to connect to the i2b2 service
    #[error("Failed to connect to i2b2 service: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Request was cancelled before a response arrived
    #[error("Request cancelled: {0}")]
    Cancelled(String),

    /// Authentication rejected by the proxy
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body was not well-formed XML
    #[error("Malformed response body: {0}")]
    MalformedResponse(String),
}

impl TransportError {
    /// Whether the fault is transient
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectionFailed(_)
                | TransportError::Timeout(_)
                | TransportError::ServerError { .. }
        )
    }
}

/// Response protocol errors
///
/// Raised only for documents the parser cannot interpret at all. Missing
/// optional data never produces one of these.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Root element is not a PDO response
    #[error("Unrecognized response document: {0}")]
    UnrecognizedDocument(String),

    /// The service reported a failure in the response header
    #[error("i2b2 service returned status {status_type}: {message}")]
    ServiceStatus { status_type: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for I2b2Error {
    fn from(err: std::io::Error) -> Self {
        I2b2Error::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for I2b2Error {
    fn from(err: serde_json::Error) -> Self {
        I2b2Error::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for I2b2Error {
    fn from(err: toml::de::Error) -> Self {
        I2b2Error::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_i2b2_error_display() {
        let err = I2b2Error::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_template_error_conversion_keeps_source() {
        let err: I2b2Error = TemplateError::MissingField("project_id").into();
        assert!(matches!(err, I2b2Error::Template(_)));

        let source = err.source().expect("template error should be the source");
        assert_eq!(
            source.to_string(),
            "Missing required request field: project_id"
        );
    }

    #[test]
    fn test_transport_error_conversion_keeps_source() {
        let err: I2b2Error = TransportError::Timeout("60s elapsed".to_string()).into();
        assert!(matches!(err, I2b2Error::Transport(_)));

        let source = err
            .source()
            .and_then(|s| s.downcast_ref::<TransportError>())
            .expect("transport error should be downcastable");
        assert!(matches!(source, TransportError::Timeout(_)));
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::ServiceStatus {
            status_type: "ERROR".to_string(),
            message: "Session invalid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "i2b2 service returned status ERROR: Session invalid"
        );
    }

    #[test]
    fn test_retryable_classification() {
        let timeout: I2b2Error = TransportError::Timeout("t".to_string()).into();
        assert!(timeout.is_retryable());

        let server: I2b2Error = TransportError::ServerError {
            status: 503,
            message: "unavailable".to_string(),
        }
        .into();
        assert!(server.is_retryable());

        let client: I2b2Error = TransportError::ClientError {
            status: 400,
            message: "bad".to_string(),
        }
        .into();
        assert!(!client.is_retryable());

        let template: I2b2Error = TemplateError::MissingField("domain").into();
        assert!(!template.is_retryable());

        let cancelled: I2b2Error = TransportError::Cancelled("shutdown".to_string()).into();
        assert!(!cancelled.is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: I2b2Error = io_err.into();
        assert!(matches!(err, I2b2Error::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: I2b2Error = json_err.into();
        assert!(matches!(err, I2b2Error::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: I2b2Error = toml_err.into();
        assert!(matches!(err, I2b2Error::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
