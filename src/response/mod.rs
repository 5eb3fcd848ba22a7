//! PDO response parsing
//!
//! ```rust
//! use i2b2_pdo::adapters::ResponseDocument;
//! use i2b2_pdo::response;
//!
//! let doc = ResponseDocument::parse("<response><message_body/></response>").unwrap();
//! let results = response::parse(&doc).unwrap();
//! assert!(results.is_empty());
//! ```

pub mod parser;
mod values;

pub use parser::parse;
