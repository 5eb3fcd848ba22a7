//! Core orchestration.
//!
//! - [`retriever`] - the [`PdoRetriever`] that ties request rendering, the
//!   transport and response parsing together
//!
//! # Workflow
//!
//! 1. **Message id**: taken from the transport
//! 2. **Render**: typed parameters into the PDO request document
//! 3. **Post**: one call through [`crate::adapters::XmlPostSupport`]
//! 4. **Parse**: the reply into [`crate::domain::PdoResults`]

pub mod retriever;

pub use retriever::{render_pdo_request, PdoRetriever};
