//! PDO response parser
//!
//! Walks an i2b2 `response` document and builds [`PdoResults`]. Elements are
//! matched by local name so any namespace prefix is accepted. Only an
//! unrecognizable document or an `ERROR` status aborts; everything else that
//! cannot be used is skipped or defaulted and recorded as a [`ParseFault`].

use super::values::{parse_datetime, parse_decimal, parse_whole, Field};
use crate::adapters::ResponseDocument;
use crate::domain::{
    ConceptCode, ConceptRecord, Event, EventId, Observation, Observer, ParseFault, Patient,
    PatientId, PdoResults, ProtocolError,
};
use roxmltree::{Document, Node};
use std::collections::HashMap;

/// Parses a PDO response document
///
/// # Errors
///
/// - [`ProtocolError::UnrecognizedDocument`] if the root is not a `response`
///   element
/// - [`ProtocolError::ServiceStatus`] if the response header reports `ERROR`
pub fn parse(document: &ResponseDocument) -> Result<PdoResults, ProtocolError> {
    let doc = Document::parse(document.as_str())
        .map_err(|e| ProtocolError::UnrecognizedDocument(e.to_string()))?;
    let root = doc.root_element();

    if root.tag_name().name() != "response" {
        return Err(ProtocolError::UnrecognizedDocument(format!(
            "expected root element 'response', found '{}'",
            root.tag_name().name()
        )));
    }

    check_status(root)?;

    let Some(patient_data) = root.descendants().find(|n| is_named(n, "patient_data")) else {
        tracing::debug!("Response carries no patient_data");
        return Ok(PdoResults::empty());
    };

    let mut builder = ResultsBuilder::default();
    for child in elements(patient_data) {
        match child.tag_name().name() {
            "patient_set" => named(child, "patient").for_each(|n| builder.add_patient(n)),
            "event_set" => named(child, "event").for_each(|n| builder.add_event(n)),
            "observer_set" => named(child, "observer").for_each(|n| builder.add_observer(n)),
            "concept_set" => named(child, "concept").for_each(|n| builder.add_concept(n)),
            "observation_set" => {
                named(child, "observation").for_each(|n| builder.add_observation(n))
            }
            other => tracing::trace!(element = other, "Ignoring patient_data child"),
        }
    }

    let results = builder.finish();
    tracing::debug!(
        patient_count = results.patients().len(),
        observation_count = results.observations().len(),
        fault_count = results.faults().len(),
        "Parsed PDO response"
    );

    Ok(results)
}

fn check_status(root: Node<'_, '_>) -> Result<(), ProtocolError> {
    let status = root
        .children()
        .find(|n| is_named(n, "response_header"))
        .and_then(|header| header.descendants().find(|n| is_named(n, "status")));

    if let Some(status) = status {
        let status_type = status.attribute("type").unwrap_or_default();
        if status_type.eq_ignore_ascii_case("ERROR") {
            return Err(ProtocolError::ServiceStatus {
                status_type: status_type.to_string(),
                message: text(status).unwrap_or_default(),
            });
        }
    }

    Ok(())
}

fn is_named(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

fn named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| is_named(n, name))
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_named(n, name))
}

/// Trimmed text content, `None` when blank
fn text(node: Node<'_, '_>) -> Option<String> {
    let value: String = node
        .children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name).and_then(text)
}

/// Demographic fields that arrive either as `<param column="...">` or as
/// direct child elements
const DEMOGRAPHIC_COLUMNS: &[&str] = &[
    "sex_cd",
    "race_cd",
    "vital_status_cd",
    "age_in_years_num",
    "birth_date",
];

#[derive(Default)]
struct ResultsBuilder {
    patients: Vec<Patient>,
    patient_index: HashMap<String, usize>,
    events: Vec<Event>,
    observers: Vec<Observer>,
    concepts: Vec<ConceptRecord>,
    // paired with the element's position in observation_set
    observations: Vec<(usize, Observation)>,
    faults: Vec<ParseFault>,
    patient_position: usize,
    event_position: usize,
    observer_position: usize,
    concept_position: usize,
    observation_position: usize,
}

impl ResultsBuilder {
    fn fault(&mut self, fault: ParseFault) {
        tracing::debug!(
            element = %fault.element,
            position = fault.position,
            identifier = ?fault.identifier,
            reason = %fault.reason,
            "Skipping unusable response data"
        );
        self.faults.push(fault);
    }

    /// Applies `Field::read`, recording a fault for invalid values
    fn field<T>(
        &mut self,
        element: &str,
        position: usize,
        identifier: &str,
        raw: Option<&str>,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        match Field::read(raw, parse) {
            Field::Missing => None,
            Field::Value(value) => Some(value),
            Field::Invalid(value) => {
                self.fault(
                    ParseFault::new(element, position, format!("unparseable value '{value}'"))
                        .with_identifier(identifier),
                );
                None
            }
        }
    }

    fn add_patient(&mut self, node: Node<'_, '_>) {
        let position = self.patient_position;
        self.patient_position += 1;

        let id_node = child(node, "patient_id");
        let Some(id) = id_node
            .and_then(text)
            .and_then(|raw| PatientId::new(raw).ok())
        else {
            self.fault(ParseFault::new("patient", position, "missing patient_id"));
            return;
        };

        if self.patient_index.contains_key(id.as_str()) {
            self.fault(
                ParseFault::new("patient", position, "duplicate patient_id")
                    .with_identifier(id.as_str()),
            );
            return;
        }

        let mut patient = Patient::new(id);
        patient.source = id_node.and_then(|n| n.attribute("source")).map(str::to_string);

        for element in elements(node) {
            let name = element.tag_name().name();
            let column = if name == "param" {
                element.attribute("column").or_else(|| element.attribute("name"))
            } else if DEMOGRAPHIC_COLUMNS.contains(&name) {
                Some(name)
            } else {
                None
            };
            if let (Some(column), Some(value)) = (column, text(element)) {
                patient.params.insert(column.to_string(), value);
            }
        }

        let id = patient.id.to_string();
        patient.sex = patient.params.get("sex_cd").cloned();
        patient.race = patient.params.get("race_cd").cloned();
        patient.vital_status = patient.params.get("vital_status_cd").cloned();
        let age = patient.params.get("age_in_years_num").cloned();
        patient.age_in_years = self.field("age_in_years_num", position, &id, age.as_deref(), parse_whole);
        let birth = patient.params.get("birth_date").cloned();
        patient.birth_date = self.field("birth_date", position, &id, birth.as_deref(), parse_datetime);

        self.patient_index.insert(id, self.patients.len());
        self.patients.push(patient);
    }

    fn add_event(&mut self, node: Node<'_, '_>) {
        let position = self.event_position;
        self.event_position += 1;

        let Some(id) = child_text(node, "event_id").and_then(|raw| EventId::new(raw).ok()) else {
            self.fault(ParseFault::new("event", position, "missing event_id"));
            return;
        };
        let ident = id.to_string();

        let patient_id = child_text(node, "patient_id").and_then(|raw| PatientId::new(raw).ok());
        let start = child_text(node, "start_date");
        let end = child_text(node, "end_date");

        let mut params = std::collections::BTreeMap::new();
        for param in named(node, "param") {
            let column = param.attribute("column").or_else(|| param.attribute("name"));
            if let (Some(column), Some(value)) = (column, text(param)) {
                params.insert(column.to_string(), value);
            }
        }

        let event = Event {
            id,
            patient_id,
            start_date: self.field("start_date", position, &ident, start.as_deref(), parse_datetime),
            end_date: self.field("end_date", position, &ident, end.as_deref(), parse_datetime),
            params,
        };
        self.events.push(event);
    }

    fn add_observer(&mut self, node: Node<'_, '_>) {
        let position = self.observer_position;
        self.observer_position += 1;

        let Some(code) = child_text(node, "observer_cd") else {
            self.fault(ParseFault::new("observer", position, "missing observer_cd"));
            return;
        };

        self.observers.push(Observer {
            code,
            path: child_text(node, "observer_path"),
            name: child_text(node, "name_char"),
        });
    }

    fn add_concept(&mut self, node: Node<'_, '_>) {
        let position = self.concept_position;
        self.concept_position += 1;

        let Some(code) = child_text(node, "concept_cd").and_then(|raw| ConceptCode::new(raw).ok())
        else {
            self.fault(ParseFault::new("concept", position, "missing concept_cd"));
            return;
        };

        self.concepts.push(ConceptRecord {
            code,
            path: child_text(node, "concept_path"),
            name: child_text(node, "name_char"),
        });
    }

    fn add_observation(&mut self, node: Node<'_, '_>) {
        let position = self.observation_position;
        self.observation_position += 1;

        let patient_id = child_text(node, "patient_id").and_then(|raw| PatientId::new(raw).ok());
        let concept_code = child_text(node, "concept_cd").and_then(|raw| ConceptCode::new(raw).ok());

        let (patient_id, concept_code) = match (patient_id, concept_code) {
            (Some(patient_id), Some(concept_code)) => (patient_id, concept_code),
            (None, _) => {
                self.fault(ParseFault::new("observation", position, "missing patient_id"));
                return;
            }
            (Some(patient_id), None) => {
                self.fault(
                    ParseFault::new("observation", position, "missing concept_cd")
                        .with_identifier(patient_id.as_str()),
                );
                return;
            }
        };

        let ident = patient_id.to_string();
        let mut observation = Observation::new(patient_id, concept_code);
        observation.event_id = child_text(node, "event_id").and_then(|raw| EventId::new(raw).ok());
        observation.observer_code = child_text(node, "observer_cd");
        observation.modifier_code = child_text(node, "modifier_cd");
        observation.value_type = child_text(node, "valuetype_cd");
        observation.text_value = child_text(node, "tval_char");
        observation.value_flag = child_text(node, "valueflag_cd");
        observation.units = child_text(node, "units_cd");
        observation.location_code = child_text(node, "location_cd");

        let start = child_text(node, "start_date");
        observation.start_date = self.field("start_date", position, &ident, start.as_deref(), parse_datetime);
        let end = child_text(node, "end_date");
        observation.end_date = self.field("end_date", position, &ident, end.as_deref(), parse_datetime);
        let instance = child_text(node, "instance_num");
        observation.instance_num = self.field("instance_num", position, &ident, instance.as_deref(), parse_whole);
        let nval = child_text(node, "nval_num");
        observation.numeric_value = self.field("nval_num", position, &ident, nval.as_deref(), parse_decimal);

        self.observations.push((position, observation));
    }

    /// Links events and observations to their patients
    fn finish(mut self) -> PdoResults {
        for event in &self.events {
            if let Some(&index) = event
                .patient_id
                .as_ref()
                .and_then(|id| self.patient_index.get(id.as_str()))
            {
                self.patients[index].event_ids.push(event.id.clone());
            }
        }

        let mut orphans = Vec::new();
        for (position, observation) in &self.observations {
            match self.patient_index.get(observation.patient_id.as_str()) {
                Some(&index) => self.patients[index]
                    .observations
                    .entry(observation.concept_code.clone())
                    .or_default()
                    .push(observation.clone()),
                None => orphans.push(
                    ParseFault::new("observation", *position, "patient not in patient_set")
                        .with_identifier(observation.patient_id.as_str()),
                ),
            }
        }
        for fault in orphans {
            self.fault(fault);
        }

        PdoResults::new(
            self.patients,
            self.events,
            self.observers,
            self.concepts,
            self.observations.into_iter().map(|(_, o)| o).collect(),
            self.faults,
        )
    }
}
