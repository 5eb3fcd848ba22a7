//! Transport collaborator trait
//!
//! The retriever never touches the network itself. It hands the rendered
//! request to an [`XmlPostSupport`] implementation and gets back a
//! [`ResponseDocument`], which is guaranteed to be well-formed XML.

use crate::domain::TransportError;
use async_trait::async_trait;

/// A well-formed XML response body
///
/// Only constructible through [`ResponseDocument::parse`], so holding one
/// means the text has already been checked for well-formedness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDocument {
    xml: String,
}

impl ResponseDocument {
    /// Checks that `xml` is a well-formed document and wraps it
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MalformedResponse`] if the body does not
    /// parse as XML.
    pub fn parse(xml: impl Into<String>) -> Result<Self, TransportError> {
        let xml = xml.into();
        roxmltree::Document::parse(&xml)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;
        Ok(Self { xml })
    }

    /// Raw document text
    pub fn as_str(&self) -> &str {
        &self.xml
    }

    /// Consumes the document and returns its text
    pub fn into_inner(self) -> String {
        self.xml
    }
}

/// Posts PDO requests to an i2b2 service
///
/// Implementations must be usable from concurrent tasks.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use i2b2_pdo::adapters::{ResponseDocument, XmlPostSupport};
/// use i2b2_pdo::domain::TransportError;
///
/// struct Canned;
///
/// #[async_trait]
/// impl XmlPostSupport for Canned {
///     async fn post_xml_request(&self, _xml: &str) -> Result<ResponseDocument, TransportError> {
///         ResponseDocument::parse("<response/>")
///     }
///
///     fn generate_message_id(&self) -> String {
///         "fixed".to_string()
///     }
/// }
/// ```
#[async_trait]
pub trait XmlPostSupport: Send + Sync {
    /// Sends the request document and returns the service's reply
    async fn post_xml_request(&self, xml: &str) -> Result<ResponseDocument, TransportError>;

    /// Returns a fresh message id for the next request
    fn generate_message_id(&self) -> String;
}

/// New random message id (UUID v4)
pub fn random_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
