//! PDO retriever - orchestrates a single PDO call
//!
//! One call is: generate a message id, render the request, post it through
//! the transport, parse the reply. No retries happen here; the transport
//! owns its retry policy.

use crate::adapters::{HttpXmlPostSupport, XmlPostSupport};
use crate::config::ServiceConfig;
use crate::domain::{AuthMetadata, Concept, I2b2Error, PatientSet, PdoResults, Result};
use crate::request::RequestParameters;
use crate::response;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Lower bound of the requested patient list
const PATIENT_LIST_MIN: f64 = 1.0;

/// Retrieves Patient Data Objects from an i2b2 service
///
/// Holds only the service host URL and the transport, so one retriever can
/// serve concurrent calls.
///
/// # Example
///
/// ```rust,no_run
/// use i2b2_pdo::config::ServiceConfig;
/// use i2b2_pdo::core::PdoRetriever;
/// use i2b2_pdo::domain::{AuthMetadata, Concept, PatientSet};
///
/// # async fn example() -> i2b2_pdo::domain::Result<()> {
/// let retriever = PdoRetriever::from_config(&ServiceConfig::default())?;
///
/// let auth = AuthMetadata::new("EMORY", "jdoe", "tok123", "P1");
/// let concepts = vec![Concept::new("LAB:GLU").unwrap()];
/// let patient_set = PatientSet::new("SET1", 50.0).unwrap();
///
/// let results = retriever.retrieve(&auth, &concepts, &patient_set).await?;
/// println!("{} patients", results.patients().len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PdoRetriever {
    service_host_url: String,
    transport: Arc<dyn XmlPostSupport>,
}

impl PdoRetriever {
    /// Creates a retriever posting through the given transport
    pub fn new(service_host_url: impl Into<String>, transport: Arc<dyn XmlPostSupport>) -> Self {
        Self {
            service_host_url: service_host_url.into(),
            transport,
        }
    }

    /// Creates a retriever with the HTTP transport built from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let transport = HttpXmlPostSupport::new(config)?;
        Ok(Self::new(config.service_host_url.clone(), Arc::new(transport)))
    }

    /// Service host URL used in the request's redirect
    pub fn service_host_url(&self) -> &str {
        &self.service_host_url
    }

    /// Renders the request document without sending it
    ///
    /// # Errors
    ///
    /// Returns [`I2b2Error::Template`] if a required field is missing or a
    /// number cannot be rendered
    pub fn render_request(
        &self,
        auth: &AuthMetadata,
        concepts: &[Concept],
        patient_set: &PatientSet,
        message_id: &str,
    ) -> Result<String> {
        render_pdo_request(&self.service_host_url, auth, concepts, patient_set, message_id)
    }

    /// Retrieves the patients, visits and observations of `patient_set`
    /// restricted to `concepts`
    ///
    /// # Errors
    ///
    /// Every failure is an [`crate::domain::I2b2Error`]: `Template` if the
    /// request cannot be rendered, `Transport` if the call fails and
    /// `Protocol` if the reply is not a usable PDO response.
    pub async fn retrieve(
        &self,
        auth: &AuthMetadata,
        concepts: &[Concept],
        patient_set: &PatientSet,
    ) -> Result<PdoResults> {
        let message_id = self.transport.generate_message_id();
        let span = tracing::info_span!(
            "pdo_retrieve",
            message_id = %message_id,
            project_id = %auth.project_id(),
            patient_set = %patient_set.coll_id(),
            concept_count = concepts.len(),
        );

        async move {
            let started = Instant::now();
            crate::log_retrieval_start!(patient_set.coll_id(), concepts.len());
            let xml = self.render_request(auth, concepts, patient_set, &message_id)?;
            tracing::debug!(bytes = xml.len(), "Rendered PDO request");

            let document = self.transport.post_xml_request(&xml).await.map_err(|e| {
                crate::log_error_with_context!(&e, "PDO request failed");
                e
            })?;

            let results = response::parse(&document).map_err(|e| {
                crate::log_error_with_context!(&e, "PDO response rejected");
                e
            })?;

            crate::log_retrieval_complete!(
                results.patients().len(),
                results.observations().len(),
                results.faults().len(),
                started.elapsed()
            );

            Ok::<_, I2b2Error>(results)
        }
        .instrument(span)
        .await
    }
}

/// Renders the PDO request for the given inputs
///
/// The service host becomes the proxy redirect target; the patient set size
/// bounds both the patient list and the PDO header's patient set limit.
///
/// # Errors
///
/// Returns [`I2b2Error::Template`] if a required field is missing or a
/// number cannot be rendered
pub fn render_pdo_request(
    service_host_url: &str,
    auth: &AuthMetadata,
    concepts: &[Concept],
    patient_set: &PatientSet,
    message_id: &str,
) -> Result<String> {
    let xml = RequestParameters::new()
        .redirect_host(service_host_url)
        .domain(auth.domain())
        .username(auth.username())
        .password_node(auth.expose_password_node())
        .message_id(message_id)
        .project_id(auth.project_id())
        .patient_list_max(patient_set.size())
        .patient_list_min(PATIENT_LIST_MIN)
        .patient_set_coll_id(patient_set.coll_id().as_str())
        .concepts(concepts)
        .render()?;
    Ok(xml)
}

impl std::fmt::Debug for PdoRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdoRetriever")
            .field("service_host_url", &self.service_host_url)
            .finish_non_exhaustive()
    }
}
