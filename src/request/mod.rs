//! PDO request rendering
//!
//! - [`template`] - the fixed request document and its parameters
//! - [`format`] - locale-independent numeric formatting
//!
//! Password node handling is internal: callers pass the raw node through
//! [`RequestParameters::password_node`].

pub mod format;
mod password;
pub mod template;

pub use format::format_number;
pub use template::{RequestParameters, PDO_REQUEST_PATH, PDO_REQUEST_TEMPLATE};
