//! Password node interpretation
//!
//! The PM cell hands out the session credential either as a bare token or as
//! a complete `<password>` element. Both are normalized into the attributes
//! and text of a single element, which the request writer then escapes like
//! any other content. Raw markup is never copied into the request.

use crate::domain::TemplateError;

const DEFAULT_TOKEN_TIMEOUT_MS: &str = "1800000";

/// A normalized `<password>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PasswordElement {
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) text: String,
}

impl PasswordElement {
    /// Interprets a password node
    ///
    /// A value starting with `<` must be a single `<password>` element with
    /// text content only; anything else is treated as a session token.
    pub(crate) fn parse(raw: &str) -> Result<Self, TemplateError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TemplateError::MissingField("password_node"));
        }

        if !trimmed.starts_with('<') {
            return Ok(Self {
                attributes: vec![
                    (
                        "token_ms_timeout".to_string(),
                        DEFAULT_TOKEN_TIMEOUT_MS.to_string(),
                    ),
                    ("is_token".to_string(), "true".to_string()),
                ],
                text: trimmed.to_string(),
            });
        }

        let doc = roxmltree::Document::parse(trimmed)
            .map_err(|e| TemplateError::InvalidPasswordNode(e.to_string()))?;
        let root = doc.root_element();

        if root.tag_name().name() != "password" {
            return Err(TemplateError::InvalidPasswordNode(format!(
                "expected a <password> element, got <{}>",
                root.tag_name().name()
            )));
        }

        if root.children().any(|c| c.is_element()) {
            return Err(TemplateError::InvalidPasswordNode(
                "<password> must not contain child elements".to_string(),
            ));
        }

        let attributes = root
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect();
        let text = root.text().unwrap_or_default().trim().to_string();

        Ok(Self { attributes, text })
    }
}
