// i2b2 PDO Client - Patient Data Object retrieval for i2b2 hives
// Copyright (c) 2025 i2b2-pdo Contributors
// Licensed under the MIT License

//! # i2b2 PDO Client
//!
//! A client for the i2b2 clinical data warehouse's Patient Data Object (PDO)
//! retrieval protocol. Given credentials, a list of concepts and a patient
//! set, it renders the PDO request document, posts it to the i2b2 proxy and
//! parses the reply into typed patients, visits and observations.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The [`core::PdoRetriever`] orchestrating one call
//! - [`request`] - Request document rendering and numeric formatting
//! - [`response`] - Response document parsing
//! - [`adapters`] - Transport trait and the HTTP implementation
//! - [`domain`] - Domain types, result model and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use i2b2_pdo::config::load_config;
//! use i2b2_pdo::core::PdoRetriever;
//! use i2b2_pdo::domain::{AuthMetadata, Concept, PatientSet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("i2b2.toml")?;
//!     let retriever = PdoRetriever::from_config(&config.i2b2)?;
//!
//!     let auth = AuthMetadata::new("EMORY", "jdoe", "tok123", "P1");
//!     let concepts = vec![Concept::new("LAB:GLU")?];
//!     let patient_set = PatientSet::new("SET1", 50.0)?;
//!
//!     let results = retriever.retrieve(&auth, &concepts, &patient_set).await?;
//!     for patient in results.patients() {
//!         println!(
//!             "{}: {} glucose results",
//!             patient.id,
//!             patient.observations_for("LAB:GLU").len()
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every failure of [`core::PdoRetriever::retrieve`] is a
//! [`domain::I2b2Error`] whose variant names the failing layer and whose
//! `source()` is that layer's error:
//!
//! ```rust,no_run
//! use i2b2_pdo::domain::I2b2Error;
//!
//! fn report(err: &I2b2Error) {
//!     match err {
//!         I2b2Error::Transport(e) if e.is_retryable() => eprintln!("try again: {e}"),
//!         I2b2Error::Protocol(e) => eprintln!("service rejected the request: {e}"),
//!         other => eprintln!("{other}"),
//!     }
//! }
//! ```
//!
//! ## Testing Without a Server
//!
//! The retriever takes any [`adapters::XmlPostSupport`], so tests can
//! supply canned responses instead of the HTTP transport.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod request;
pub mod response;
