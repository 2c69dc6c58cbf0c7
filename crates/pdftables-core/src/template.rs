//! Declarative extraction templates.
//!
//! A [`Template`] is an ordered list of uniquely named items: tables with a
//! fixed column/row layout, and text fields located by a [`FieldRule`].

use std::collections::HashSet;

use regex::Regex;

use crate::error::{Error, LayoutIssue, Result};
use crate::geometry::BBox;
use crate::grid::TableGrid;

/// Explicit column x-positions and row y-positions of a template table.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTableLayout {
    grid: TableGrid,
}

impl TemplateTableLayout {
    /// # Errors
    ///
    /// Returns a [`LayoutIssue`] unless both sequences have at least two
    /// finite, strictly increasing entries.
    pub fn new(columns: Vec<f64>, rows: Vec<f64>) -> std::result::Result<Self, LayoutIssue> {
        TableGrid::new(columns, rows).map(|grid| Self { grid })
    }

    pub fn columns(&self) -> &[f64] {
        self.grid.columns()
    }

    pub fn rows(&self) -> &[f64] {
        self.grid.rows()
    }

    /// The grid this layout describes.
    pub fn grid(&self) -> &TableGrid {
        &self.grid
    }
}

/// A table item: a named layout, optionally bound to one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTable {
    name: String,
    layout: TemplateTableLayout,
    page_index: Option<usize>,
}

impl TemplateTable {
    /// Create a table item from raw positions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTemplateLayout`] if the positions do not form a
    /// valid layout.
    pub fn new(name: impl Into<String>, columns: Vec<f64>, rows: Vec<f64>) -> Result<Self> {
        let name = name.into();
        match TemplateTableLayout::new(columns, rows) {
            Ok(layout) => Ok(Self::from_layout(name, layout)),
            Err(issue) => Err(Error::InvalidTemplateLayout { name, issue }),
        }
    }

    pub fn from_layout(name: impl Into<String>, layout: TemplateTableLayout) -> Self {
        Self {
            name: name.into(),
            layout,
            page_index: None,
        }
    }

    /// Restrict the item to the page with index `page_index`.
    pub fn on_page(mut self, page_index: usize) -> Self {
        self.page_index = Some(page_index);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &TemplateTableLayout {
        &self.layout
    }

    pub fn page_index(&self) -> Option<usize> {
        self.page_index
    }
}

/// How a text field finds its value on a page.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// First match over the page's lines in reading order. The value is the
    /// capture group named `value`, else group 1, else the whole match.
    Regex(Regex),
    /// Text following this label on the same line.
    Label(String),
    /// Text of the runs whose origin lies inside this rectangle.
    Region(BBox),
}

impl PartialEq for FieldRule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldRule::Regex(a), FieldRule::Regex(b)) => a.as_str() == b.as_str(),
            (FieldRule::Label(a), FieldRule::Label(b)) => a == b,
            (FieldRule::Region(a), FieldRule::Region(b)) => a == b,
            _ => false,
        }
    }
}

/// A text field item.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateField {
    name: String,
    rule: FieldRule,
    page_index: Option<usize>,
}

impl TemplateField {
    pub fn new(name: impl Into<String>, rule: FieldRule) -> Self {
        Self {
            name: name.into(),
            rule,
            page_index: None,
        }
    }

    /// Restrict the item to the page with index `page_index`.
    pub fn on_page(mut self, page_index: usize) -> Self {
        self.page_index = Some(page_index);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self) -> &FieldRule {
        &self.rule
    }

    pub fn page_index(&self) -> Option<usize> {
        self.page_index
    }
}

/// One item of a template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateItem {
    Table(TemplateTable),
    Field(TemplateField),
}

impl TemplateItem {
    pub fn name(&self) -> &str {
        match self {
            TemplateItem::Table(t) => t.name(),
            TemplateItem::Field(f) => f.name(),
        }
    }

    pub fn page_index(&self) -> Option<usize> {
        match self {
            TemplateItem::Table(t) => t.page_index(),
            TemplateItem::Field(f) => f.page_index(),
        }
    }

    /// Returns `true` if the item is evaluated on the page with `page_index`.
    pub fn applies_to(&self, page_index: usize) -> bool {
        self.page_index().is_none_or(|p| p == page_index)
    }
}

impl From<TemplateTable> for TemplateItem {
    fn from(table: TemplateTable) -> Self {
        TemplateItem::Table(table)
    }
}

impl From<TemplateField> for TemplateItem {
    fn from(field: TemplateField) -> Self {
        TemplateItem::Field(field)
    }
}

/// An ordered collection of uniquely named template items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    items: Vec<TemplateItem>,
}

impl Template {
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTemplateItem`] if two items share a name.
    pub fn new(items: Vec<TemplateItem>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = items.iter().find(|item| !seen.insert(item.name())) {
            return Err(Error::DuplicateTemplateItem(dup.name().to_string()));
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[TemplateItem] {
        &self.items
    }

    /// Table items, in template order.
    pub fn tables(&self) -> impl Iterator<Item = &TemplateTable> {
        self.items.iter().filter_map(|item| match item {
            TemplateItem::Table(t) => Some(t),
            TemplateItem::Field(_) => None,
        })
    }

    /// Field items, in template order.
    pub fn fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.items.iter().filter_map(|item| match item {
            TemplateItem::Field(f) => Some(f),
            TemplateItem::Table(_) => None,
        })
    }

    /// Look up an item by name.
    pub fn get(&self, name: &str) -> Option<&TemplateItem> {
        self.items.iter().find(|item| item.name() == name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_valid() {
        let layout = TemplateTableLayout::new(vec![0.0, 10.0, 20.0], vec![0.0, 5.0]).unwrap();
        assert_eq!(layout.columns(), &[0.0, 10.0, 20.0]);
        assert_eq!(layout.rows(), &[0.0, 5.0]);
        assert_eq!(layout.grid().column_count(), 2);
    }

    #[test]
    fn test_layout_rejects_single_column_position() {
        let err = TemplateTable::new("Items", vec![10.0], vec![0.0, 5.0]).unwrap_err();
        match err {
            Error::InvalidTemplateLayout { name, issue } => {
                assert_eq!(name, "Items");
                assert_eq!(
                    issue,
                    LayoutIssue::TooFewBoundaries {
                        axis: "column",
                        count: 1
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_layout_rejects_decreasing_rows() {
        let err = TemplateTableLayout::new(vec![0.0, 10.0], vec![0.0, 8.0, 4.0]).unwrap_err();
        assert!(matches!(
            err,
            LayoutIssue::NotIncreasing {
                axis: "row",
                index: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_layout_rejects_infinity() {
        let err = TemplateTableLayout::new(vec![0.0, f64::INFINITY], vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, LayoutIssue::NonFinite { axis: "column", index: 1 }));
    }

    #[test]
    fn test_template_rejects_duplicate_names() {
        let table = TemplateTable::new("Items", vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        let field = TemplateField::new("Items", FieldRule::Label("Total:".to_string()));
        let err = Template::new(vec![table.into(), field.into()]).unwrap_err();
        assert!(matches!(err, Error::DuplicateTemplateItem(ref n) if n == "Items"));
    }

    #[test]
    fn test_template_accessors() {
        let table = TemplateTable::new("Items", vec![0.0, 1.0], vec![0.0, 1.0])
            .unwrap()
            .on_page(1);
        let field = TemplateField::new("Total", FieldRule::Label("Total:".to_string()));
        let template = Template::new(vec![table.into(), field.into()]).unwrap();

        assert_eq!(template.len(), 2);
        assert_eq!(template.tables().count(), 1);
        assert_eq!(template.fields().count(), 1);
        let item = template.get("Items").unwrap();
        assert_eq!(item.page_index(), Some(1));
        assert!(item.applies_to(1));
        assert!(!item.applies_to(0));
        assert!(template.get("Total").unwrap().applies_to(7));
        assert!(template.get("Missing").is_none());
    }

    #[test]
    fn test_field_rule_equality() {
        let a = FieldRule::Regex(Regex::new(r"No\.\s*(\d+)").unwrap());
        let b = FieldRule::Regex(Regex::new(r"No\.\s*(\d+)").unwrap());
        assert_eq!(a, b);
        assert_ne!(a, FieldRule::Label("No.".to_string()));
    }
}
