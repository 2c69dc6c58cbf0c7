//! XML template configuration.
//!
//! ```xml
//! <Template>
//!   <Table name="Items" page="0">
//!     <Columns><Column x="10"/><Column x="120"/></Columns>
//!     <Rows><Row y="200"/><Row y="220"/></Rows>
//!   </Table>
//!   <Field name="InvoiceNo" regex="No\.\s*(\d+)"/>
//!   <Field name="Vendor" label="Vendor:"/>
//!   <Field name="Title" x0="0" top="0" x1="300" bottom="40"/>
//! </Template>
//! ```
//!
//! Structural problems (malformed XML, a foreign root, unknown element names,
//! no usable table item) fail the whole load. An item with missing or unparsable
//! values is skipped and reported as a [`TemplateDiagnostic`].

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use tracing::warn;

use crate::error::{Error, Loaded, Result, TemplateDiagnostic};
use crate::geometry::BBox;
use crate::template::{FieldRule, Template, TemplateField, TemplateItem, TemplateTable};

/// Element names accepted anywhere in a template document.
const KNOWN_ELEMENTS: &[&str] = &[
    "Template", "Table", "Columns", "Column", "Rows", "Row", "Field",
];

/// Minimal element tree built from the XML event stream.
#[derive(Debug)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn load_failure(message: impl Into<String>) -> Error {
    Error::TemplateLoadFailure(message.into())
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| load_failure(format!("element name is not UTF-8: {e}")))?
        .to_string();
    if !KNOWN_ELEMENTS.contains(&name.as_str()) {
        return Err(load_failure(format!("unknown element <{name}>")));
    }

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| load_failure(format!("bad attribute on <{name}>: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| load_failure(format!("attribute name is not UTF-8: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| load_failure(format!("bad value for '{key}' on <{name}>: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Parse `xml` into an element tree, rejecting unknown element names.
fn parse_tree(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            load_failure(format!(
                "malformed XML at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;
        let finished = match event {
            Event::Start(e) => {
                stack.push(element_from(&e)?);
                None
            }
            Event::Empty(e) => Some(element_from(&e)?),
            Event::End(_) => stack.pop(),
            Event::Eof => break,
            // Text, comments, declarations and processing instructions carry no configuration
            _ => None,
        };

        if let Some(element) = finished {
            match stack.last_mut() {
                Some(parent) => parent.children.push(element),
                None if root.is_none() => root = Some(element),
                None => return Err(load_failure("document has more than one root element")),
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(load_failure(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| load_failure("document has no root element"))
}

/// Why an item is skipped.
type Skip = String;

fn required_f64(element: &Element, key: &str) -> std::result::Result<f64, Skip> {
    let raw = element
        .attr(key)
        .ok_or_else(|| format!("<{}> is missing '{key}'", element.name))?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{key} value '{raw}' is not a number"))
}

fn optional_page(element: &Element) -> std::result::Result<Option<usize>, Skip> {
    element
        .attr("page")
        .map(|raw| {
            raw.trim()
                .parse::<usize>()
                .map_err(|_| format!("page value '{raw}' is not a page index"))
        })
        .transpose()
}

fn positions(
    table: &Element,
    container: &str,
    child: &str,
    key: &str,
) -> std::result::Result<Vec<f64>, Skip> {
    let mut containers = table.children_named(container);
    let list = containers
        .next()
        .ok_or_else(|| format!("table has no <{container}>"))?;
    if containers.next().is_some() {
        return Err(format!("table has more than one <{container}>"));
    }
    if let Some(stray) = list.children.iter().find(|c| c.name != child) {
        return Err(format!("<{}> is not allowed inside <{container}>", stray.name));
    }
    list.children
        .iter()
        .map(|c| required_f64(c, key))
        .collect()
}

/// Build a table item, or `Ok(Err(reason))` when the item should be skipped.
fn table_item(
    element: &Element,
    name: &str,
) -> Result<std::result::Result<TemplateItem, Skip>> {
    if let Some(stray) = element
        .children
        .iter()
        .find(|c| c.name != "Columns" && c.name != "Rows")
    {
        return Ok(Err(format!("<{}> is not allowed inside <Table>", stray.name)));
    }
    let parsed = (|| {
        let page = optional_page(element)?;
        let columns = positions(element, "Columns", "Column", "x")?;
        let rows = positions(element, "Rows", "Row", "y")?;
        Ok::<_, Skip>((page, columns, rows))
    })();
    let (page, columns, rows) = match parsed {
        Ok(parsed) => parsed,
        Err(reason) => return Ok(Err(reason)),
    };

    // Layout violations are fatal, not skipped
    let table = TemplateTable::new(name, columns, rows)?;
    let table = match page {
        Some(p) => table.on_page(p),
        None => table,
    };
    Ok(Ok(table.into()))
}

fn field_item(element: &Element, name: &str) -> std::result::Result<TemplateItem, Skip> {
    if let Some(child) = element.children.first() {
        return Err(format!("<{}> is not allowed inside <Field>", child.name));
    }
    let page = optional_page(element)?;

    let has_region = ["x0", "top", "x1", "bottom"]
        .iter()
        .any(|k| element.attr(k).is_some());
    let mut rules: Vec<FieldRule> = Vec::new();
    if let Some(pattern) = element.attr("regex") {
        let re = Regex::new(pattern).map_err(|e| format!("invalid regex: {e}"))?;
        rules.push(FieldRule::Regex(re));
    }
    if let Some(label) = element.attr("label") {
        if label.trim().is_empty() {
            return Err("label is empty".to_string());
        }
        rules.push(FieldRule::Label(label.to_string()));
    }
    if has_region {
        let bbox = BBox::new(
            required_f64(element, "x0")?,
            required_f64(element, "top")?,
            required_f64(element, "x1")?,
            required_f64(element, "bottom")?,
        );
        if bbox.width() < 0.0 || bbox.height() < 0.0 {
            return Err("region has negative width or height".to_string());
        }
        rules.push(FieldRule::Region(bbox));
    }

    if rules.len() != 1 {
        return Err(format!(
            "field needs exactly one of regex, label or region, found {}",
            rules.len()
        ));
    }
    let mut field = TemplateField::new(name, rules.remove(0));
    if let Some(p) = page {
        field = field.on_page(p);
    }
    Ok(field.into())
}

/// Load a template from XML text.
///
/// # Errors
///
/// - [`Error::TemplateLoadFailure`] for malformed XML, a root other than
///   `<Template>`, unknown elements, or when no table item survives.
/// - [`Error::InvalidTemplateLayout`] for a table whose positions are not
///   strictly increasing.
/// - [`Error::DuplicateTemplateItem`] when two items share a name.
pub fn load_template_str(xml: &str) -> Result<Loaded<Template>> {
    let root = parse_tree(xml)?;
    if root.name != "Template" {
        return Err(load_failure(format!(
            "root element is <{}>, expected <Template>",
            root.name
        )));
    }

    let mut items = Vec::new();
    let mut diagnostics = Vec::new();
    for (index, element) in root.children.iter().enumerate() {
        let name = element.attr("name").map(str::trim).filter(|n| !n.is_empty());
        let outcome = match (element.name.as_str(), name) {
            ("Table" | "Field", None) => Err("missing name".to_string()),
            ("Table", Some(name)) => table_item(element, name)?,
            ("Field", Some(name)) => field_item(element, name),
            (other, _) => {
                return Err(load_failure(format!(
                    "<{other}> is not allowed inside <Template>"
                )));
            }
        };
        match outcome {
            Ok(item) => items.push(item),
            Err(message) => {
                let diagnostic = TemplateDiagnostic::new(index, name, message);
                warn!(%diagnostic, "skipping template item");
                diagnostics.push(diagnostic);
            }
        }
    }

    if items.is_empty() {
        return Err(load_failure(if diagnostics.is_empty() {
            "template defines no items".to_string()
        } else {
            format!("all {} template items were skipped", diagnostics.len())
        }));
    }
    if !items.iter().any(|item| matches!(item, TemplateItem::Table(_))) {
        return Err(load_failure("template defines no usable table item"));
    }

    let template = Template::new(items)?;
    Ok(Loaded::with_diagnostics(template, diagnostics))
}

/// Load a template from an XML file.
pub fn load_template_file(path: impl AsRef<Path>) -> Result<Loaded<Template>> {
    let xml = std::fs::read_to_string(path)?;
    load_template_str(&xml)
}
