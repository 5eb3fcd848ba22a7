//! External system integrations.
//!
//! - [`transport`] - the [`XmlPostSupport`] trait and [`ResponseDocument`]
//! - [`http`] - reqwest implementation posting to the i2b2 proxy
//!
//! The retriever only depends on the trait, so tests and embedding
//! applications can supply their own transport.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use i2b2_pdo::adapters::{HttpXmlPostSupport, XmlPostSupport};
//! use i2b2_pdo::config::ServiceConfig;
//!
//! # fn example() -> i2b2_pdo::domain::Result<()> {
//! let config = ServiceConfig::default();
//! let transport: Arc<dyn XmlPostSupport> = Arc::new(HttpXmlPostSupport::new(&config)?);
//! # Ok(())
//! # }
//! ```

pub mod http;
pub mod transport;

pub use http::HttpXmlPostSupport;
pub use transport::{random_message_id, ResponseDocument, XmlPostSupport};
