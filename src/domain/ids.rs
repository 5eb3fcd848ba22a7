//! Domain identifier types with validation
//!
//! Newtype wrappers for the i2b2 identifiers that cross the wire. Each type
//! rejects blank values so a missing identifier is caught where it is created
//! instead of producing an empty XML element.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new ", $label, ", rejecting blank values")]
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(concat!($label, " cannot be empty").to_string());
                }
                Ok(Self(id))
            }

            #[doc = concat!("Returns the ", $label, " as a string slice")]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes self and returns the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Patient identifier as reported by the i2b2 CRC cell
    ///
    /// ```
    /// use i2b2_pdo::domain::ids::PatientId;
    ///
    /// let id = PatientId::new("1000000001").unwrap();
    /// assert_eq!(id.as_str(), "1000000001");
    /// ```
    PatientId,
    "Patient ID"
);

string_id!(
    /// Visit (event) identifier
    EventId,
    "Event ID"
);

string_id!(
    /// Concept code (`concept_cd`), e.g. `LAB:GLU` or `ICD9:250.00`
    ConceptCode,
    "Concept code"
);

string_id!(
    /// Identifier of a previously materialized patient set
    /// (`patient_set_coll_id`)
    PatientSetId,
    "Patient set collection ID"
);

string_id!(
    /// Per-request correlation token (`message_num`)
    MessageId,
    "Message ID"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_id_valid() {
        let id = PatientId::new("42").unwrap();
        assert_eq!(id.as_str(), "42");
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_blank_ids_rejected() {
        assert!(PatientId::new("").is_err());
        assert!(ConceptCode::new("   ").is_err());
        assert_eq!(
            PatientSetId::new("").unwrap_err(),
            "Patient set collection ID cannot be empty"
        );
    }

    #[test]
    fn test_from_str() {
        let code = ConceptCode::from_str("LAB:GLU").unwrap();
        assert_eq!(code.into_inner(), "LAB:GLU");
    }

    #[test]
    fn test_serialization_is_transparent_string() {
        let id = MessageId::new("abc-123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc-123\"");
    }
}
