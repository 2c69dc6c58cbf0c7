//! Error and diagnostic types for pdftables.
//!
//! Provides [`Error`] for failures returned to the caller, [`LayoutIssue`]
//! describing why a boundary sequence was rejected, [`TemplateDiagnostic`]
//! for template items skipped during a best-effort load, and [`Loaded`] for
//! pairing a value with the diagnostics collected while producing it.

use std::fmt;

use thiserror::Error;

/// Fatal error types.
///
/// Table extraction itself never fails on a well-formed page; these errors
/// come from the page boundary and from template construction/loading.
#[derive(Debug, Error)]
pub enum Error {
    /// A template table layout is too short or not strictly increasing.
    #[error("invalid layout for template item '{name}': {issue}")]
    InvalidTemplateLayout {
        /// Name of the offending template item.
        name: String,
        /// What is wrong with the positions.
        issue: LayoutIssue,
    },
    /// Two template items share a name.
    #[error("duplicate template item name '{0}'")]
    DuplicateTemplateItem(String),
    /// The template configuration could not be turned into a usable template.
    #[error("template load failed: {0}")]
    TemplateLoadFailure(String),
    /// The content provider handed over inconsistent page data.
    #[error("malformed page {page}: {reason}")]
    MalformedPage {
        /// Index of the rejected page.
        page: usize,
        /// Human-readable description of the inconsistency.
        reason: String,
    },
    /// Error reading a template file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Reason a sequence of boundary positions is not a valid grid axis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutIssue {
    /// Fewer than two positions (no cell fits between them).
    #[error("{axis} positions need at least 2 entries, got {count}")]
    TooFewBoundaries {
        /// `"column"` or `"row"`.
        axis: &'static str,
        /// Number of positions supplied.
        count: usize,
    },
    /// A position is not greater than the one before it.
    #[error("{axis} position #{index} ({value}) does not increase on the previous one")]
    NotIncreasing {
        axis: &'static str,
        index: usize,
        value: f64,
    },
    /// A position is NaN or infinite.
    #[error("{axis} position #{index} is not a finite number")]
    NonFinite { axis: &'static str, index: usize },
}

/// A template item skipped while loading a template configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateDiagnostic {
    /// Position of the item among the template's items (0-based).
    pub item_index: usize,
    /// Item name, when the item got far enough to have one.
    pub item_name: Option<String>,
    /// Why the item was skipped.
    pub message: String,
}

impl TemplateDiagnostic {
    pub fn new(item_index: usize, item_name: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            item_index,
            item_name: item_name.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for TemplateDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item #{}", self.item_index)?;
        if let Some(ref name) = self.item_name {
            write!(f, " '{name}'")?;
        }
        write!(f, " skipped: {}", self.message)
    }
}

/// Wrapper that pairs a value with the diagnostics collected while building it.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    /// The loaded value.
    pub value: T,
    /// Items that were skipped.
    pub diagnostics: Vec<TemplateDiagnostic>,
}

impl<T> Loaded<T> {
    /// Create a result with no diagnostics.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// Create a result with diagnostics.
    pub fn with_diagnostics(value: T, diagnostics: Vec<TemplateDiagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Returns true if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Transform the value while preserving diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_template_layout_message() {
        let err = Error::InvalidTemplateLayout {
            name: "Items".to_string(),
            issue: LayoutIssue::TooFewBoundaries {
                axis: "column",
                count: 1,
            },
        };
        assert_eq!(
            err.to_string(),
            "invalid layout for template item 'Items': column positions need at least 2 entries, got 1"
        );
    }

    #[test]
    fn test_not_increasing_message() {
        let issue = LayoutIssue::NotIncreasing {
            axis: "row",
            index: 2,
            value: 4.5,
        };
        assert_eq!(
            issue.to_string(),
            "row position #2 (4.5) does not increase on the previous one"
        );
    }

    #[test]
    fn test_malformed_page_message() {
        let err = Error::MalformedPage {
            page: 3,
            reason: "run #0 has negative width".to_string(),
        };
        assert_eq!(err.to_string(), "malformed page 3: run #0 has negative width");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.xml");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("missing.xml"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = TemplateDiagnostic::new(1, Some("Items"), "column position 'abc' is not a number");
        assert_eq!(
            diag.to_string(),
            "item #1 'Items' skipped: column position 'abc' is not a number"
        );
        let unnamed = TemplateDiagnostic::new(0, None, "missing name");
        assert_eq!(unnamed.to_string(), "item #0 skipped: missing name");
    }

    #[test]
    fn test_loaded_helpers() {
        let loaded = Loaded::ok(5);
        assert!(loaded.is_clean());
        let loaded = Loaded::with_diagnostics(5, vec![TemplateDiagnostic::new(0, None, "x")])
            .map(|v| v * 2);
        assert_eq!(loaded.value, 10);
        assert!(!loaded.is_clean());
    }
}
