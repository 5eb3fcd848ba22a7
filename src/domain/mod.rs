//! Domain models and types for the PDO client.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Request inputs** ([`AuthMetadata`], [`Concept`], [`PatientSet`])
//! - **Strongly-typed identifiers** ([`PatientId`], [`ConceptCode`], [`PatientSetId`], ...)
//! - **Result model** ([`PdoResults`], [`Patient`], [`Observation`], ...)
//! - **Error types** ([`I2b2Error`], [`TemplateError`], [`TransportError`], [`ProtocolError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Every layer has its own error enum, and all of them convert into
//! [`I2b2Error`] with `?`:
//!
//! ```rust
//! use i2b2_pdo::domain::{I2b2Error, Result, TemplateError};
//!
//! fn render() -> std::result::Result<String, TemplateError> {
//!     Err(TemplateError::MissingField("project_id"))
//! }
//!
//! fn example() -> Result<String> {
//!     let xml = render()?;
//!     Ok(xml)
//! }
//!
//! assert!(matches!(example(), Err(I2b2Error::Template(_))));
//! ```

pub mod auth;
pub mod concept;
pub mod errors;
pub mod ids;
pub mod patient_set;
pub mod pdo;
pub mod result;

// Re-export commonly used types for convenience
pub use auth::AuthMetadata;
pub use concept::{Concept, ConceptBuilder};
pub use errors::{I2b2Error, ProtocolError, TemplateError, TransportError};
pub use ids::{ConceptCode, EventId, MessageId, PatientId, PatientSetId};
pub use patient_set::PatientSet;
pub use pdo::{ConceptRecord, Event, Observation, Observer, ParseFault, Patient, PdoResults};
pub use result::Result;
