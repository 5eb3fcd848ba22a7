//! Patient Data Object result model
//!
//! These types are produced by the response parser. They own all of their
//! data; nothing refers back into the XML document they were read from.

use super::ids::{ConceptCode, EventId, PatientId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// A patient from the response's patient set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    /// Patient identifier
    pub id: PatientId,

    /// Identifier source (`patient_id@source`)
    pub source: Option<String>,

    /// Age in years (`age_in_years_num`)
    pub age_in_years: Option<u32>,

    /// Sex code (`sex_cd`)
    pub sex: Option<String>,

    /// Race code (`race_cd`)
    pub race: Option<String>,

    /// Vital status code (`vital_status_cd`)
    pub vital_status: Option<String>,

    /// Birth date (`birth_date`)
    pub birth_date: Option<DateTime<Utc>>,

    /// Every `<param>` value keyed by its column name
    pub params: BTreeMap<String, String>,

    /// Visits belonging to this patient, in document order
    pub event_ids: Vec<EventId>,

    /// Observations for this patient keyed by concept code
    pub observations: BTreeMap<ConceptCode, Vec<Observation>>,
}

impl Patient {
    /// Creates a patient with only an identifier
    pub fn new(id: PatientId) -> Self {
        Self {
            id,
            source: None,
            age_in_years: None,
            sex: None,
            race: None,
            vital_status: None,
            birth_date: None,
            params: BTreeMap::new(),
            event_ids: Vec::new(),
            observations: BTreeMap::new(),
        }
    }

    /// Observations recorded for the given concept code
    pub fn observations_for(&self, concept: &str) -> &[Observation] {
        self.observations
            .iter()
            .find(|(code, _)| code.as_str() == concept)
            .map(|(_, obs)| obs.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of observations across all concepts
    pub fn observation_count(&self) -> usize {
        self.observations.values().map(Vec::len).sum()
    }
}

/// A visit from the response's event set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Visit identifier
    pub id: EventId,

    /// Patient the visit belongs to
    pub patient_id: Option<PatientId>,

    /// Visit start
    pub start_date: Option<DateTime<Utc>>,

    /// Visit end
    pub end_date: Option<DateTime<Utc>>,

    /// Every `<param>` value keyed by its column name
    pub params: BTreeMap<String, String>,
}

/// A provider from the response's observer set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observer {
    /// Provider code (`observer_cd`)
    pub code: String,

    /// Provider path
    pub path: Option<String>,

    /// Display name (`name_char`)
    pub name: Option<String>,
}

/// A concept description from the response's concept set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptRecord {
    /// Concept code (`concept_cd`)
    pub code: ConceptCode,

    /// Concept path
    pub path: Option<String>,

    /// Display name (`name_char`)
    pub name: Option<String>,
}

/// One fact from the response's observation set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Patient the fact is about
    pub patient_id: PatientId,

    /// Concept the fact records
    pub concept_code: ConceptCode,

    /// Visit the fact was recorded in
    pub event_id: Option<EventId>,

    /// Provider code
    pub observer_code: Option<String>,

    /// Start of the fact
    pub start_date: Option<DateTime<Utc>>,

    /// End of the fact
    pub end_date: Option<DateTime<Utc>>,

    /// Modifier code
    pub modifier_code: Option<String>,

    /// Instance number
    pub instance_num: Option<u32>,

    /// Value type (`valuetype_cd`, e.g. `N` or `T`)
    pub value_type: Option<String>,

    /// Text value or numeric operator (`tval_char`)
    pub text_value: Option<String>,

    /// Numeric value (`nval_num`)
    pub numeric_value: Option<Decimal>,

    /// Abnormal flag (`valueflag_cd`)
    pub value_flag: Option<String>,

    /// Units (`units_cd`)
    pub units: Option<String>,

    /// Location code
    pub location_code: Option<String>,
}

impl Observation {
    /// Creates an observation with only the required identity
    pub fn new(patient_id: PatientId, concept_code: ConceptCode) -> Self {
        Self {
            patient_id,
            concept_code,
            event_id: None,
            observer_code: None,
            start_date: None,
            end_date: None,
            modifier_code: None,
            instance_num: None,
            value_type: None,
            text_value: None,
            numeric_value: None,
            value_flag: None,
            units: None,
            location_code: None,
        }
    }
}

/// A node or field the parser could not use
///
/// Faults are how the parser reports malformed input without aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFault {
    /// Local name of the element the fault concerns
    pub element: String,

    /// Zero-based position of the element within its set
    pub position: usize,

    /// Identifier of the enclosing record, when one was readable
    pub identifier: Option<String>,

    /// What was wrong
    pub reason: String,
}

impl ParseFault {
    /// Creates a fault
    pub fn new(element: impl Into<String>, position: usize, reason: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            position,
            identifier: None,
            reason: reason.into(),
        }
    }

    /// Sets the identifier of the enclosing record
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

/// Parsed PDO response
///
/// Built once per call by the response parser and never modified afterward.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PdoResults {
    patients: Vec<Patient>,
    events: Vec<Event>,
    observers: Vec<Observer>,
    concepts: Vec<ConceptRecord>,
    observations: Vec<Observation>,
    faults: Vec<ParseFault>,
}

impl PdoResults {
    pub(crate) fn new(
        patients: Vec<Patient>,
        events: Vec<Event>,
        observers: Vec<Observer>,
        concepts: Vec<ConceptRecord>,
        observations: Vec<Observation>,
        faults: Vec<ParseFault>,
    ) -> Self {
        Self {
            patients,
            events,
            observers,
            concepts,
            observations,
            faults,
        }
    }

    /// Creates an empty result set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Patients in document order
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Looks up a patient by id
    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id.as_str() == id)
    }

    /// Visits in document order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Providers in document order
    pub fn observers(&self) -> &[Observer] {
        &self.observers
    }

    /// Concept descriptions in document order
    pub fn concepts(&self) -> &[ConceptRecord] {
        &self.concepts
    }

    /// Every parsed observation in document order, including those whose
    /// patient was not in the patient set
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Nodes and fields that could not be used
    pub fn faults(&self) -> &[ParseFault] {
        &self.faults
    }

    /// True when the response carried no patients and no observations
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty() && self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn observation(patient: &str, concept: &str) -> Observation {
        Observation::new(
            PatientId::new(patient).unwrap(),
            ConceptCode::new(concept).unwrap(),
        )
    }

    #[test]
    fn test_patient_observations_for() {
        let mut patient = Patient::new(PatientId::new("1").unwrap());
        let code = ConceptCode::new("LAB:GLU").unwrap();
        let mut obs = observation("1", "LAB:GLU");
        obs.numeric_value = Some(Decimal::from_str("95").unwrap());
        patient.observations.entry(code).or_default().push(obs);

        assert_eq!(patient.observations_for("LAB:GLU").len(), 1);
        assert!(patient.observations_for("LAB:NA").is_empty());
        assert_eq!(patient.observation_count(), 1);
    }

    #[test]
    fn test_empty_results() {
        let results = PdoResults::empty();
        assert!(results.is_empty());
        assert!(results.patients().is_empty());
        assert!(results.faults().is_empty());
        assert!(results.patient("1").is_none());
    }

    #[test]
    fn test_parse_fault_builder() {
        let fault = ParseFault::new("nval_num", 2, "not a number").with_identifier("42");
        assert_eq!(fault.element, "nval_num");
        assert_eq!(fault.position, 2);
        assert_eq!(fault.identifier.as_deref(), Some("42"));
    }

    #[test]
    fn test_results_serialize_to_json() {
        let patient = Patient::new(PatientId::new("7").unwrap());
        let results = PdoResults::new(vec![patient], vec![], vec![], vec![], vec![], vec![]);
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["patients"][0]["id"], "7");
    }
}
