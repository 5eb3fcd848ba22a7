//! Requested concept model
//!
//! A [`Concept`] names one clinical data element the PDO request filters on.
//! Each concept becomes one filter panel in the request.

use serde::{Deserialize, Serialize};

const DEFAULT_TABLE_NAME: &str = "concept_dimension";
const DEFAULT_COLUMN_NAME: &str = "concept_path";
const DEFAULT_OPERATOR: &str = "LIKE";

/// A concept requested in a PDO query
///
/// Only the key is required. The dimension metadata defaults to a plain
/// `concept_dimension` lookup on the key itself.
///
/// # Examples
///
/// ```
/// use i2b2_pdo::domain::Concept;
///
/// let concept = Concept::builder("\\\\i2b2\\i2b2\\Labs\\GLU\\")
///     .level(3)
///     .display_name("Glucose")
///     .build()
///     .unwrap();
///
/// assert_eq!(concept.level(), 3);
/// assert_eq!(concept.table_name(), "concept_dimension");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    key: String,
    level: u32,
    table_name: String,
    column_name: String,
    dim_code: String,
    operator: String,
    synonym: bool,
    display_name: Option<String>,
}

impl Concept {
    /// Creates a concept with default dimension metadata
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        ConceptBuilder::new(key).build()
    }

    /// Starts a builder for a concept with the given key
    pub fn builder(key: impl Into<String>) -> ConceptBuilder {
        ConceptBuilder::new(key)
    }

    /// The concept key (`item_key`)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Hierarchy level (`hlevel`)
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Dimension table (`dim_tablename`)
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Dimension column (`dim_columnname`)
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Dimension code (`dim_dimcode`)
    pub fn dim_code(&self) -> &str {
        &self.dim_code
    }

    /// Dimension operator (`dim_operator`)
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Whether the item is a synonym
    pub fn is_synonym(&self) -> bool {
        self.synonym
    }

    /// Human-readable name, if known
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Builder for [`Concept`]
#[derive(Debug, Default)]
pub struct ConceptBuilder {
    key: String,
    level: u32,
    table_name: Option<String>,
    column_name: Option<String>,
    dim_code: Option<String>,
    operator: Option<String>,
    synonym: bool,
    display_name: Option<String>,
}

impl ConceptBuilder {
    /// Creates a builder for the given key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Sets the hierarchy level
    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Sets the dimension table name
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Sets the dimension column name
    pub fn column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    /// Sets the dimension code
    pub fn dim_code(mut self, dim_code: impl Into<String>) -> Self {
        self.dim_code = Some(dim_code.into());
        self
    }

    /// Sets the dimension operator
    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Marks the item as a synonym
    pub fn synonym(mut self, synonym: bool) -> Self {
        self.synonym = synonym;
        self
    }

    /// Sets the display name
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Builds the concept
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank
    pub fn build(self) -> Result<Concept, String> {
        if self.key.trim().is_empty() {
            return Err("Concept key cannot be empty".to_string());
        }

        let dim_code = self.dim_code.unwrap_or_else(|| self.key.clone());

        Ok(Concept {
            key: self.key,
            level: self.level,
            table_name: self
                .table_name
                .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            column_name: self
                .column_name
                .unwrap_or_else(|| DEFAULT_COLUMN_NAME.to_string()),
            dim_code,
            operator: self.operator.unwrap_or_else(|| DEFAULT_OPERATOR.to_string()),
            synonym: self.synonym,
            display_name: self.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_defaults() {
        let concept = Concept::new("LAB:GLU").unwrap();
        assert_eq!(concept.key(), "LAB:GLU");
        assert_eq!(concept.level(), 0);
        assert_eq!(concept.table_name(), "concept_dimension");
        assert_eq!(concept.column_name(), "concept_path");
        assert_eq!(concept.dim_code(), "LAB:GLU");
        assert_eq!(concept.operator(), "LIKE");
        assert!(!concept.is_synonym());
        assert_eq!(concept.display_name(), None);
    }

    #[test]
    fn test_concept_builder_overrides() {
        let concept = Concept::builder("\\\\i2b2\\Diagnoses\\")
            .level(2)
            .table_name("concept_dimension")
            .column_name("concept_path")
            .dim_code("\\Diagnoses\\")
            .operator("=")
            .synonym(true)
            .display_name("Diagnoses")
            .build()
            .unwrap();

        assert_eq!(concept.level(), 2);
        assert_eq!(concept.dim_code(), "\\Diagnoses\\");
        assert_eq!(concept.operator(), "=");
        assert!(concept.is_synonym());
        assert_eq!(concept.display_name(), Some("Diagnoses"));
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(Concept::new("  ").is_err());
    }
}
