use std::path::Path;

use pdftables_core::{Document, ExtractionSettings, Table, TableExtractor, group_by_page};

use crate::cli::{DetectionArgs, OutputFormat};
use crate::shared::{load_document, load_settings, print_csv, render_grid, resolve_pages, table_json};

pub fn run(
    file: &Path,
    pages: Option<&str>,
    format: &OutputFormat,
    detection: &DetectionArgs,
) -> Result<(), i32> {
    let document = load_document(file)?;
    let page_indices = resolve_pages(pages, document.page_count())?;
    let settings = build_settings(detection)?;

    let tables = extract(&TableExtractor::new(settings), &document, pages, &page_indices);

    match format {
        OutputFormat::Text => write_grid(&tables, document.page_count()),
        OutputFormat::Json => write_json(&tables),
        OutputFormat::Csv => write_csv(&tables),
    }
}

fn extract(
    extractor: &TableExtractor,
    document: &Document,
    pages: Option<&str>,
    page_indices: &[usize],
) -> Vec<Table> {
    if pages.is_none() {
        return extractor.extract_document(document);
    }
    page_indices
        .iter()
        .filter_map(|&idx| document.page(idx))
        .flat_map(|page| extractor.extract_page(page))
        .collect()
}

/// Start from the settings file (or defaults) and apply explicit flags on top.
fn build_settings(detection: &DetectionArgs) -> Result<ExtractionSettings, i32> {
    let mut settings = match detection.settings {
        Some(ref path) => load_settings(path)?,
        None => ExtractionSettings::default(),
    };

    if let Some(strategy) = detection.strategy {
        settings.strategy = strategy.to_strategy();
    }
    if let Some(gap) = detection.gap_multiplier {
        settings.gap_multiplier = gap;
    }
    if let Some(tolerance) = detection.merge_tolerance {
        settings.merge_tolerance = tolerance;
    }
    if let Some(tolerance) = detection.span_tolerance {
        settings.span_tolerance = tolerance;
    }
    if let Some(merge) = detection.merge_empty {
        settings.merge_empty = merge.to_merge_empty();
    }

    for (name, value) in [
        ("gap-multiplier", settings.gap_multiplier),
        ("merge-tolerance", settings.merge_tolerance),
        ("span-tolerance", settings.span_tolerance),
    ] {
        if !value.is_finite() || value < 0.0 {
            eprintln!("Error: --{name} must be a non-negative number, got {value}");
            return Err(1);
        }
    }
    Ok(settings)
}

fn write_grid(tables: &[Table], page_count: usize) -> Result<(), i32> {
    println!("Total pages: {page_count}");
    println!();

    if tables.is_empty() {
        println!("No tables found.");
        return Ok(());
    }

    for (page_index, page_tables) in group_by_page(tables) {
        println!("Tables in the Page {}", page_index + 1);
        println!();
        for (i, table) in page_tables.iter().enumerate() {
            println!(
                "  Table {}: {} rows x {} columns",
                i + 1,
                table.row_count(),
                table.column_count()
            );
            for line in render_grid(table) {
                println!("{line}");
            }
        }
        println!();
    }

    Ok(())
}

fn write_json(tables: &[Table]) -> Result<(), i32> {
    let all: Vec<serde_json::Value> = tables.iter().map(table_json).collect();
    let json_str = serde_json::to_string(&all).map_err(|e| {
        eprintln!("Error: failed to serialize tables: {e}");
        1
    })?;
    println!("{json_str}");
    Ok(())
}

fn write_csv(tables: &[Table]) -> Result<(), i32> {
    for (i, table) in tables.iter().enumerate() {
        // Blank line between tables
        if i > 0 {
            println!();
        }
        print_csv(table);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{MergeEmptyArg, TableStrategy};
    use pdftables_core::{MergeEmpty, Strategy};
    use std::io::Write;

    fn make_args() -> DetectionArgs {
        DetectionArgs {
            strategy: None,
            gap_multiplier: None,
            merge_tolerance: None,
            span_tolerance: None,
            merge_empty: None,
            settings: None,
        }
    }

    #[test]
    fn build_settings_defaults() {
        assert_eq!(build_settings(&make_args()).unwrap(), ExtractionSettings::default());
    }

    #[test]
    fn build_settings_flags_override() {
        let args = DetectionArgs {
            strategy: Some(TableStrategy::Ruled),
            gap_multiplier: Some(4.0),
            merge_empty: Some(MergeEmptyArg::Rows),
            ..make_args()
        };
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.strategy, Strategy::Ruled);
        assert_eq!(settings.gap_multiplier, 4.0);
        assert_eq!(settings.merge_empty, MergeEmpty::Rows);
        assert_eq!(settings.span_tolerance, 2.0);
    }

    #[test]
    fn build_settings_from_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"gap_multiplier": 5.0, "span_tolerance": 3.0}}"#).unwrap();
        let args = DetectionArgs {
            span_tolerance: Some(1.5),
            settings: Some(file.path().to_path_buf()),
            ..make_args()
        };
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.gap_multiplier, 5.0);
        assert_eq!(settings.span_tolerance, 1.5);
        assert_eq!(settings.tie_tolerance, 1.0);
    }

    #[test]
    fn build_settings_rejects_negative_tolerance() {
        let args = DetectionArgs {
            merge_tolerance: Some(-1.0),
            ..make_args()
        };
        assert_eq!(build_settings(&args).unwrap_err(), 1);
    }
}
