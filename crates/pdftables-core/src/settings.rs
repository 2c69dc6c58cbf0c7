//! Tunable configuration for table detection and cell text assembly.

/// Where rulings come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Strategy {
    /// Use drawn lines and rectangles; fall back to whitespace inference when
    /// they cannot bound a single cell.
    #[default]
    Auto,
    /// Use only drawn lines and rectangles.
    Ruled,
    /// Infer rulings from whitespace gaps in the text layout only.
    Whitespace,
}

/// Policy for collapsing adjacent empty rows/columns of automatically detected tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MergeEmpty {
    /// Keep the grid exactly as detected.
    #[default]
    None,
    /// Collapse runs of adjacent empty rows into one.
    Rows,
    /// Collapse runs of adjacent empty columns into one.
    Columns,
    /// Collapse both.
    Both,
}

impl MergeEmpty {
    pub(crate) fn merges_rows(self) -> bool {
        matches!(self, MergeEmpty::Rows | MergeEmpty::Both)
    }

    pub(crate) fn merges_columns(self) -> bool {
        matches!(self, MergeEmpty::Columns | MergeEmpty::Both)
    }
}

/// Configuration for table extraction.
///
/// Distances are in page points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ExtractionSettings {
    /// Ruling source selection.
    pub strategy: Strategy,
    /// A whitespace gap wider than this multiple of the median character
    /// width separates two columns.
    pub gap_multiplier: f64,
    /// Candidate boundaries (and run baselines) closer than this are treated
    /// as the same position; the first one wins.
    pub tie_tolerance: f64,
    /// Parallel rulings or boundaries closer than this collapse into one.
    pub merge_tolerance: f64,
    /// Slack allowed when deciding whether rulings meet or span a table area.
    pub span_tolerance: f64,
    /// Drawn segments shorter than this are ignored.
    pub min_ruling_length: f64,
    /// Whitespace inference needs at least this many columns to report a table.
    pub min_inferred_columns: usize,
    /// Whitespace inference needs at least this many rows to report a table.
    pub min_inferred_rows: usize,
    /// Joins runs on the same line of a cell.
    pub word_separator: String,
    /// Joins lines of a cell.
    pub line_separator: String,
    /// Empty row/column collapsing for detected tables.
    pub merge_empty: MergeEmpty,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            gap_multiplier: 2.0,
            tie_tolerance: 1.0,
            merge_tolerance: 1.0,
            span_tolerance: 2.0,
            min_ruling_length: 1.0,
            min_inferred_columns: 2,
            min_inferred_rows: 2,
            word_separator: " ".to_string(),
            line_separator: "\n".to_string(),
            merge_empty: MergeEmpty::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_default_is_auto() {
        assert_eq!(Strategy::default(), Strategy::Auto);
    }

    #[test]
    fn test_settings_default_values() {
        let settings = ExtractionSettings::default();
        assert_eq!(settings.strategy, Strategy::Auto);
        assert_eq!(settings.gap_multiplier, 2.0);
        assert_eq!(settings.tie_tolerance, 1.0);
        assert_eq!(settings.merge_tolerance, 1.0);
        assert_eq!(settings.span_tolerance, 2.0);
        assert_eq!(settings.min_ruling_length, 1.0);
        assert_eq!(settings.min_inferred_columns, 2);
        assert_eq!(settings.min_inferred_rows, 2);
        assert_eq!(settings.word_separator, " ");
        assert_eq!(settings.line_separator, "\n");
        assert_eq!(settings.merge_empty, MergeEmpty::None);
    }

    #[test]
    fn test_settings_custom_construction() {
        let settings = ExtractionSettings {
            strategy: Strategy::Whitespace,
            gap_multiplier: 3.0,
            ..ExtractionSettings::default()
        };
        assert_eq!(settings.strategy, Strategy::Whitespace);
        assert_eq!(settings.gap_multiplier, 3.0);
        assert_eq!(settings.merge_tolerance, 1.0);
    }

    #[test]
    fn test_merge_empty_flags() {
        assert!(!MergeEmpty::None.merges_rows());
        assert!(MergeEmpty::Rows.merges_rows());
        assert!(!MergeEmpty::Rows.merges_columns());
        assert!(MergeEmpty::Both.merges_rows() && MergeEmpty::Both.merges_columns());
    }
}
