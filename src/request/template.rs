//! PDO request document writer
//!
//! The request shape is fixed here rather than loaded from a template file,
//! so every rendered document matches what the response parser expects.
//! All text and attribute values go through the `quick-xml` writer, which
//! escapes them.

use super::format::format_number;
use super::password::PasswordElement;
use crate::domain::{Concept, TemplateError};
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use std::io;

/// Version tag of the request document shape
pub const PDO_REQUEST_TEMPLATE: &str = "i2b2_pdo_request/1.1";

/// Path appended to the service host for the proxy redirect
pub const PDO_REQUEST_PATH: &str = "/QueryToolService/pdorequest";

const RESULT_WAITTIME_MS: &str = "180000";
const REQUEST_TYPE: &str = "getPDO_fromInputList";

const NAMESPACES: [(&str, &str); 7] = [
    ("xmlns:ns2", "http://www.i2b2.org/xsd/hive/pdo/1.1/"),
    ("xmlns:ns3", "http://www.i2b2.org/xsd/cell/crc/pdo/1.1/"),
    ("xmlns:ns4", "http://www.i2b2.org/xsd/cell/crc/psm/1.1/"),
    ("xmlns:ns5", "http://www.i2b2.org/xsd/hive/plugin/"),
    ("xmlns:ns6", "http://www.i2b2.org/xsd/hive/msg/1.1/"),
    (
        "xmlns:ns7",
        "http://www.i2b2.org/xsd/cell/crc/psm/querydefinition/1.1/",
    ),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
];

/// Values substituted into one PDO request
///
/// Built fresh for every call and dropped after rendering. A field left unset
/// (or set to a blank string) makes [`RequestParameters::render`] fail with
/// [`TemplateError::MissingField`].
///
/// # Examples
///
/// ```
/// use i2b2_pdo::domain::Concept;
/// use i2b2_pdo::request::RequestParameters;
///
/// let concepts = vec![Concept::new("LAB:GLU").unwrap()];
/// let xml = RequestParameters::new()
///     .redirect_host("http://i2b2.example.org/i2b2/services")
///     .domain("EMORY")
///     .username("jdoe")
///     .password_node("tok123")
///     .message_id("msg-1")
///     .project_id("P1")
///     .patient_list_min(1.0)
///     .patient_list_max(50.0)
///     .patient_set_coll_id("SET1")
///     .concepts(&concepts)
///     .render()
///     .unwrap();
///
/// assert!(xml.contains("<project_id>P1</project_id>"));
/// assert!(xml.contains("<patient_set_limit>50</patient_set_limit>"));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestParameters<'a> {
    redirect_host: Option<&'a str>,
    domain: Option<&'a str>,
    username: Option<&'a str>,
    password_node: Option<&'a str>,
    message_id: Option<&'a str>,
    project_id: Option<&'a str>,
    patient_list_min: Option<f64>,
    patient_list_max: Option<f64>,
    patient_set_coll_id: Option<&'a str>,
    concepts: &'a [Concept],
}

impl<'a> RequestParameters<'a> {
    /// Creates an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service host used in the proxy redirect URL
    pub fn redirect_host(mut self, value: &'a str) -> Self {
        self.redirect_host = Some(value);
        self
    }

    /// Sets the security domain
    pub fn domain(mut self, value: &'a str) -> Self {
        self.domain = Some(value);
        self
    }

    /// Sets the user name
    pub fn username(mut self, value: &'a str) -> Self {
        self.username = Some(value);
        self
    }

    /// Sets the password node (token or `<password>` element)
    pub fn password_node(mut self, value: &'a str) -> Self {
        self.password_node = Some(value);
        self
    }

    /// Sets the message id
    pub fn message_id(mut self, value: &'a str) -> Self {
        self.message_id = Some(value);
        self
    }

    /// Sets the project id
    pub fn project_id(mut self, value: &'a str) -> Self {
        self.project_id = Some(value);
        self
    }

    /// Sets the lower patient list bound
    pub fn patient_list_min(mut self, value: f64) -> Self {
        self.patient_list_min = Some(value);
        self
    }

    /// Sets the upper patient list bound, also used as the set limit
    pub fn patient_list_max(mut self, value: f64) -> Self {
        self.patient_list_max = Some(value);
        self
    }

    /// Sets the patient set collection id
    pub fn patient_set_coll_id(mut self, value: &'a str) -> Self {
        self.patient_set_coll_id = Some(value);
        self
    }

    /// Sets the requested concepts, rendered in order
    pub fn concepts(mut self, value: &'a [Concept]) -> Self {
        self.concepts = value;
        self
    }

    /// Renders the request document
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingField`] for absent required fields,
    /// [`TemplateError::InvalidNumber`] for non-finite bounds,
    /// [`TemplateError::InvalidPasswordNode`] for unusable password markup
    /// and [`TemplateError::Write`] if the writer fails.
    pub fn render(&self) -> Result<String, TemplateError> {
        let fields = RenderFields {
            redirect_url: format!(
                "{}{}",
                required(self.redirect_host, "redirect_host")?.trim_end_matches('/'),
                PDO_REQUEST_PATH
            ),
            domain: required(self.domain, "domain")?,
            username: required(self.username, "username")?,
            password: PasswordElement::parse(self.password_node.unwrap_or_default())?,
            message_id: required(self.message_id, "message_id")?,
            project_id: required(self.project_id, "project_id")?,
            patient_list_min: number(self.patient_list_min, "patient_list_min")?,
            patient_list_max: number(self.patient_list_max, "patient_list_max")?,
            patient_set_coll_id: required(self.patient_set_coll_id, "patient_set_coll_id")?,
            concepts: self.concepts,
        };

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_request(&mut writer, &fields).map_err(|e| TemplateError::Write(e.to_string()))?;

        String::from_utf8(writer.into_inner()).map_err(|e| TemplateError::Write(e.to_string()))
    }
}

/// Validated values ready for writing
struct RenderFields<'a> {
    redirect_url: String,
    domain: &'a str,
    username: &'a str,
    password: PasswordElement,
    message_id: &'a str,
    project_id: &'a str,
    patient_list_min: String,
    patient_list_max: String,
    patient_set_coll_id: &'a str,
    concepts: &'a [Concept],
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, TemplateError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(TemplateError::MissingField(field)),
    }
}

fn number(value: Option<f64>, field: &'static str) -> Result<String, TemplateError> {
    let value = value.ok_or(TemplateError::MissingField(field))?;
    format_number(value).ok_or_else(|| TemplateError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn text_element<W: io::Write>(writer: &mut Writer<W>, name: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn write_request<W: io::Write>(writer: &mut Writer<W>, fields: &RenderFields<'_>) -> io::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    writer
        .create_element("ns6:request")
        .with_attributes(NAMESPACES)
        .write_inner_content(|w| {
            write_message_header(w, fields)?;
            w.create_element("request_header").write_inner_content(|w| {
                text_element(w, "result_waittime_ms", RESULT_WAITTIME_MS)
            })?;
            write_message_body(w, fields)
        })?;

    Ok(())
}

fn write_message_header<W: io::Write>(
    writer: &mut Writer<W>,
    fields: &RenderFields<'_>,
) -> io::Result<()> {
    writer
        .create_element("message_header")
        .write_inner_content(|w| {
            w.create_element("proxy")
                .write_inner_content(|w| text_element(w, "redirect_url", &fields.redirect_url))?;
            text_element(w, "i2b2_version_compatible", "1.1")?;
            text_element(w, "hl7_version_compatible", "2.4")?;
            w.create_element("sending_application")
                .write_inner_content(|w| {
                    text_element(w, "application_name", "i2b2_QueryTool")?;
                    text_element(w, "application_version", "1.6")
                })?;
            w.create_element("sending_facility")
                .write_inner_content(|w| text_element(w, "facility_name", "PHS"))?;
            w.create_element("receiving_application")
                .write_inner_content(|w| {
                    text_element(w, "application_name", "i2b2_DataRepositoryCell")?;
                    text_element(w, "application_version", "1.6")
                })?;
            w.create_element("receiving_facility")
                .write_inner_content(|w| text_element(w, "facility_name", "PHS"))?;
            w.create_element("message_type").write_inner_content(|w| {
                text_element(w, "message_code", "Q04")?;
                text_element(w, "event_type", "EQQ")
            })?;
            w.create_element("security").write_inner_content(|w| {
                text_element(w, "domain", fields.domain)?;
                text_element(w, "username", fields.username)?;
                w.create_element("password")
                    .with_attributes(
                        fields
                            .password
                            .attributes
                            .iter()
                            .map(|(k, v)| (k.as_str(), v.as_str())),
                    )
                    .write_text_content(BytesText::new(&fields.password.text))?;
                Ok(())
            })?;
            w.create_element("message_control_id")
                .write_inner_content(|w| {
                    text_element(w, "message_num", fields.message_id)?;
                    text_element(w, "instance_num", "0")
                })?;
            w.create_element("processing_id").write_inner_content(|w| {
                text_element(w, "processing_id", "P")?;
                text_element(w, "processing_mode", "I")
            })?;
            text_element(w, "accept_acknowledgement_type", "messageId")?;
            text_element(w, "application_acknowledgement_type", "")?;
            text_element(w, "country_code", "US")?;
            text_element(w, "project_id", fields.project_id)
        })?;
    Ok(())
}

fn write_message_body<W: io::Write>(
    writer: &mut Writer<W>,
    fields: &RenderFields<'_>,
) -> io::Result<()> {
    writer
        .create_element("message_body")
        .write_inner_content(|w| {
            w.create_element("ns3:pdoheader").write_inner_content(|w| {
                text_element(w, "patient_set_limit", &fields.patient_list_max)?;
                text_element(w, "estimated_time", RESULT_WAITTIME_MS)?;
                text_element(w, "request_type", REQUEST_TYPE)
            })?;

            w.create_element("ns3:request")
                .with_attribute(("xsi:type", "ns3:GetPDOFromInputList_requestType"))
                .write_inner_content(|w| {
                    w.create_element("input_list").write_inner_content(|w| {
                        w.create_element("patient_list")
                            .with_attribute(("max", fields.patient_list_max.as_str()))
                            .with_attribute(("min", fields.patient_list_min.as_str()))
                            .write_inner_content(|w| {
                                text_element(w, "patient_set_coll_id", fields.patient_set_coll_id)
                            })?;
                        Ok(())
                    })?;

                    if fields.concepts.is_empty() {
                        w.create_element("filter_list").write_empty()?;
                    } else {
                        w.create_element("filter_list").write_inner_content(|w| {
                            for (index, concept) in fields.concepts.iter().enumerate() {
                                write_panel(w, index, concept)?;
                            }
                            Ok(())
                        })?;
                    }

                    write_output_option(w)
                })?;
            Ok(())
        })?;
    Ok(())
}

fn write_panel<W: io::Write>(
    writer: &mut Writer<W>,
    index: usize,
    concept: &Concept,
) -> io::Result<()> {
    let panel_number = index.to_string();
    let level = concept.level().to_string();

    writer
        .create_element("panel")
        .with_attribute(("name", concept.key()))
        .write_inner_content(|w| {
            text_element(w, "panel_number", &panel_number)?;
            text_element(w, "panel_accuracy_scale", "0")?;
            text_element(w, "invert", "0")?;
            w.create_element("item").write_inner_content(|w| {
                text_element(w, "hlevel", &level)?;
                if let Some(name) = concept.display_name() {
                    text_element(w, "item_name", name)?;
                }
                text_element(w, "item_key", concept.key())?;
                text_element(w, "dim_tablename", concept.table_name())?;
                text_element(w, "dim_columnname", concept.column_name())?;
                text_element(w, "dim_dimcode", concept.dim_code())?;
                text_element(w, "dim_columndatatype", "T")?;
                text_element(w, "dim_operator", concept.operator())?;
                text_element(w, "facttablecolumn", "concept_cd")?;
                text_element(
                    w,
                    "item_is_synonym",
                    if concept.is_synonym() { "true" } else { "false" },
                )
            })?;
            Ok(())
        })?;
    Ok(())
}

fn write_output_option<W: io::Write>(writer: &mut Writer<W>) -> io::Result<()> {
    writer
        .create_element("output_option")
        .with_attribute(("names", "asattributes"))
        .write_inner_content(|w| {
            w.create_element("patient_set")
                .with_attribute(("select", "using_input_list"))
                .with_attribute(("onlykeys", "false"))
                .write_empty()?;
            w.create_element("event_set")
                .with_attribute(("select", "from_facts"))
                .with_attribute(("onlykeys", "false"))
                .write_empty()?;
            w.create_element("observation_set")
                .with_attribute(("blob", "false"))
                .with_attribute(("onlykeys", "false"))
                .write_empty()?;
            w.create_element("observer_set_using_filter_list")
                .with_attribute(("onlykeys", "false"))
                .write_empty()?;
            w.create_element("concept_set_using_filter_list")
                .with_attribute(("onlykeys", "false"))
                .write_empty()?;
            Ok(())
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base<'a>(concepts: &'a [Concept]) -> RequestParameters<'a> {
        RequestParameters::new()
            .redirect_host("http://localhost:9090/i2b2/services/")
            .domain("EMORY")
            .username("jdoe")
            .password_node("tok123")
            .message_id("msg-0001")
            .project_id("P1")
            .patient_list_min(1.0)
            .patient_list_max(50.0)
            .patient_set_coll_id("SET1")
            .concepts(concepts)
    }

    #[test]
    fn test_render_contains_required_fields() {
        let concepts = vec![Concept::new("LAB:GLU").unwrap()];
        let xml = base(&concepts).render().unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains(
            "<redirect_url>http://localhost:9090/i2b2/services/QueryToolService/pdorequest</redirect_url>"
        ));
        assert!(xml.contains("<domain>EMORY</domain>"));
        assert!(xml.contains("<username>jdoe</username>"));
        assert!(xml.contains(
            r#"<password token_ms_timeout="1800000" is_token="true">tok123</password>"#
        ));
        assert!(xml.contains("<message_num>msg-0001</message_num>"));
        assert!(xml.contains("<project_id>P1</project_id>"));
        assert!(xml.contains("<patient_set_limit>50</patient_set_limit>"));
        assert!(xml.contains(r#"<patient_list max="50" min="1">"#));
        assert!(xml.contains("<patient_set_coll_id>SET1</patient_set_coll_id>"));
        assert_eq!(xml.matches("<item_key>LAB:GLU</item_key>").count(), 1);
    }

    #[test]
    fn test_render_missing_fields() {
        let concepts: Vec<Concept> = vec![];
        let cases: Vec<(RequestParameters<'_>, &str)> = vec![
            (base(&concepts).domain(""), "domain"),
            (base(&concepts).username("  "), "username"),
            (base(&concepts).message_id(""), "message_id"),
            (base(&concepts).project_id(""), "project_id"),
            (base(&concepts).patient_set_coll_id(""), "patient_set_coll_id"),
            (base(&concepts).redirect_host(""), "redirect_host"),
            (base(&concepts).password_node(""), "password_node"),
        ];

        for (params, field) in cases {
            match params.render() {
                Err(TemplateError::MissingField(f)) => assert_eq!(f, field),
                other => panic!("expected missing {field}, got {other:?}"),
            }
        }

        let unset = RequestParameters::new().render();
        assert!(matches!(unset, Err(TemplateError::MissingField(_))));
    }

    #[test]
    fn test_render_rejects_non_finite_bound() {
        let concepts: Vec<Concept> = vec![];
        let result = base(&concepts).patient_list_max(f64::INFINITY).render();
        assert!(matches!(
            result,
            Err(TemplateError::InvalidNumber {
                field: "patient_list_max",
                ..
            })
        ));
    }

    #[test]
    fn test_render_empty_concepts_writes_empty_filter_list() {
        let concepts: Vec<Concept> = vec![];
        let xml = base(&concepts).render().unwrap();
        assert!(xml.contains("<filter_list/>"));
        assert!(!xml.contains("<panel"));
    }

    #[test]
    fn test_render_concepts_in_order() {
        let concepts = vec![
            Concept::new("LAB:GLU").unwrap(),
            Concept::new("LAB:NA").unwrap(),
        ];
        let xml = base(&concepts).render().unwrap();

        let glu = xml.find("<item_key>LAB:GLU</item_key>").unwrap();
        let na = xml.find("<item_key>LAB:NA</item_key>").unwrap();
        assert!(glu < na);
        assert!(xml.contains("<panel_number>1</panel_number>"));
    }

    #[test]
    fn test_render_escapes_password_element_text() {
        let concepts: Vec<Concept> = vec![];
        let xml = base(&concepts)
            .password_node(r#"<password is_token="true">SessionKey:a&amp;b</password>"#)
            .render()
            .unwrap();
        assert!(xml.contains(r#"<password is_token="true">SessionKey:a&amp;b</password>"#));
    }
}
