//! Template-driven extraction.
//!
//! Table items map their fixed layout onto the page and reuse the automatic
//! extractor's cell assignment. Field items look up a single text value.

use tracing::debug;

use crate::page::{Document, Page};
use crate::settings::ExtractionSettings;
use crate::table::{Table, build_table, group_lines, line_text, runs_text};
use crate::template::{FieldRule, Template, TemplateItem};
use crate::text::TextRun;

/// Value extracted for one template item.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value", rename_all = "lowercase"))]
pub enum FieldValue {
    Table(Table),
    /// `None` when the field's rule found nothing on the page.
    Text(Option<String>),
}

/// Result of evaluating one template item on one page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtractedField {
    pub name: String,
    pub page_index: usize,
    pub value: FieldValue,
}

impl ExtractedField {
    pub fn as_table(&self) -> Option<&Table> {
        match &self.value {
            FieldValue::Table(t) => Some(t),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Text(t) => t.as_deref(),
            FieldValue::Table(_) => None,
        }
    }
}

/// Evaluates templates against pages.
#[derive(Debug, Clone, Default)]
pub struct TemplateExtractor {
    settings: ExtractionSettings,
}

impl TemplateExtractor {
    /// Create an extractor; only the text assembly settings
    /// (`tie_tolerance` and the separators) are used.
    pub fn new(settings: ExtractionSettings) -> Self {
        Self { settings }
    }

    /// Tables of every table item applicable to `page`, in template order.
    ///
    /// A layout lying (partly) outside the page yields empty cells rather
    /// than an error.
    pub fn apply(&self, template: &Template, page: &Page) -> Vec<Table> {
        template
            .tables()
            .filter(|t| t.page_index().is_none_or(|p| p == page.index()))
            .map(|t| build_table(t.layout().grid(), page, &self.settings))
            .collect()
    }

    /// Evaluate every item applicable to `page`, in template order.
    pub fn parse_page(&self, template: &Template, page: &Page) -> Vec<ExtractedField> {
        template
            .items()
            .iter()
            .filter(|item| item.applies_to(page.index()))
            .map(|item| {
                let value = match item {
                    TemplateItem::Table(t) => {
                        FieldValue::Table(build_table(t.layout().grid(), page, &self.settings))
                    }
                    TemplateItem::Field(f) => FieldValue::Text(self.field_text(f.rule(), page)),
                };
                ExtractedField {
                    name: item.name().to_string(),
                    page_index: page.index(),
                    value,
                }
            })
            .collect()
    }

    /// Evaluate the template on every page, in page order.
    pub fn parse_document(&self, template: &Template, document: &Document) -> Vec<ExtractedField> {
        document
            .pages()
            .iter()
            .flat_map(|page| self.parse_page(template, page))
            .collect()
    }

    fn field_text(&self, rule: &FieldRule, page: &Page) -> Option<String> {
        let value = match rule {
            FieldRule::Regex(re) => self.regex_value(re, page),
            FieldRule::Label(label) => self.label_value(label, page),
            FieldRule::Region(bbox) => {
                let inside: Vec<&TextRun> = page
                    .runs()
                    .iter()
                    .filter(|r| {
                        let (x, y) = r.origin();
                        bbox.contains_point(x, y)
                    })
                    .collect();
                Some(runs_text(inside, &self.settings))
            }
        };
        let value = value.filter(|v| !v.is_empty());
        if value.is_none() {
            debug!(page = page.index(), "template field found no value");
        }
        value
    }

    fn regex_value(&self, re: &regex::Regex, page: &Page) -> Option<String> {
        let lines = group_lines(page.runs().iter().collect(), self.settings.tie_tolerance);
        lines.iter().find_map(|line| {
            let text = line_text(line, &self.settings);
            let caps = re.captures(&text)?;
            let m = caps.name("value").or_else(|| caps.get(1)).or_else(|| caps.get(0))?;
            Some(m.as_str().trim().to_string())
        })
    }

    fn label_value(&self, label: &str, page: &Page) -> Option<String> {
        let lines = group_lines(page.runs().iter().collect(), self.settings.tie_tolerance);
        for line in &lines {
            let Some(pos) = line.iter().position(|r| r.text.contains(label)) else {
                continue;
            };
            let run = line[pos];
            let rest = run
                .text
                .split_once(label)
                .map(|(_, rest)| rest.trim())
                .unwrap_or_default();
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
            // Runs in a line are sorted left to right
            if let Some(next) = line[pos + 1..].iter().find(|r| !r.is_blank()) {
                return Some(next.text.trim().to_string());
            }
        }
        None
    }
}

/// Tables of `template` on `page`, with default settings.
pub fn apply_template(template: &Template, page: &Page) -> Vec<Table> {
    TemplateExtractor::default().apply(template, page)
}

/// All items of `template` on `page`, with default settings.
pub fn parse_page(template: &Template, page: &Page) -> Vec<ExtractedField> {
    TemplateExtractor::default().parse_page(template, page)
}

/// All items of `template` on every page of `document`, with default settings.
pub fn parse_document(template: &Template, document: &Document) -> Vec<ExtractedField> {
    TemplateExtractor::default().parse_document(template, document)
}
