//! Patient set (cohort) reference

use super::ids::PatientSetId;
use serde::{Deserialize, Serialize};

/// A previously materialized cohort
///
/// `size` bounds the number of patients the service returns. It is a plain
/// number because the request renders it as a raw numeric token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPatientSet")]
pub struct PatientSet {
    coll_id: PatientSetId,
    size: f64,
}

/// Largest size the request document can carry (the `Decimal` range)
pub const MAX_PATIENT_SET_SIZE: f64 = 7.9e28;

#[derive(Deserialize)]
struct RawPatientSet {
    coll_id: String,
    size: f64,
}

impl TryFrom<RawPatientSet> for PatientSet {
    type Error = String;

    fn try_from(raw: RawPatientSet) -> Result<Self, Self::Error> {
        PatientSet::new(raw.coll_id, raw.size)
    }
}

impl PatientSet {
    /// Creates a patient set reference
    ///
    /// # Errors
    ///
    /// Returns an error if the collection id is blank or the size is
    /// negative, not finite, or larger than [`MAX_PATIENT_SET_SIZE`].
    ///
    /// # Examples
    ///
    /// ```
    /// use i2b2_pdo::domain::PatientSet;
    ///
    /// let set = PatientSet::new("SET1", 50.0).unwrap();
    /// assert_eq!(set.coll_id().as_str(), "SET1");
    /// assert_eq!(set.size(), 50.0);
    /// ```
    pub fn new(coll_id: impl Into<String>, size: f64) -> Result<Self, String> {
        let coll_id = PatientSetId::new(coll_id)?;
        if !size.is_finite() || size < 0.0 {
            return Err(format!("Patient set size must be a non-negative number, got {size}"));
        }
        if size > MAX_PATIENT_SET_SIZE {
            return Err(format!(
                "Patient set size {size} exceeds the maximum of {MAX_PATIENT_SET_SIZE:e}"
            ));
        }
        Ok(Self { coll_id, size })
    }

    /// The patient set collection id
    pub fn coll_id(&self) -> &PatientSetId {
        &self.coll_id
    }

    /// Maximum number of patients in the set
    pub fn size(&self) -> f64 {
        self.size
    }
}
