use std::path::Path;

use pdftables_core::{Document, DocumentLayout, ExtractionSettings, Table};

use crate::page_range::parse_page_range;

/// Read a page layout JSON file and validate it into a [`Document`].
///
/// Returns `Err(1)` with a message printed to stderr if the file is missing,
/// is not valid layout JSON, or describes inconsistent pages.
pub fn load_document(file: &Path) -> Result<Document, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    let json = std::fs::read_to_string(file).map_err(|e| {
        eprintln!("Error: failed to read {}: {e}", file.display());
        1
    })?;
    let layout: DocumentLayout = serde_json::from_str(&json).map_err(|e| {
        eprintln!("Error: invalid page layout: {e}");
        1
    })?;
    Document::try_from(layout).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })
}

/// Read extraction settings from a JSON file. Missing keys keep their defaults.
pub fn load_settings(file: &Path) -> Result<ExtractionSettings, i32> {
    let json = std::fs::read_to_string(file).map_err(|e| {
        eprintln!("Error: failed to read settings {}: {e}", file.display());
        1
    })?;
    serde_json::from_str(&json).map_err(|e| {
        eprintln!("Error: invalid settings: {e}");
        1
    })
}

/// Resolve an optional page range string into 0-indexed page indices.
///
/// If `pages` is `None`, returns all pages (0..page_count).
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<Vec<usize>, i32> {
    match pages {
        Some(range) => parse_page_range(range, page_count).map_err(|e| {
            eprintln!("Error: {e}");
            1
        }),
        None => Ok((0..page_count).collect()),
    }
}

/// Escape a string for CSV output.
///
/// If the text contains commas, double quotes, or newlines, wraps it in
/// double quotes and escapes any internal double quotes by doubling them.
pub fn csv_escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Render a table as a bordered grid, one string per output line.
///
/// Every line is indented by four spaces. Columns are at least three
/// characters wide and a separator follows the first (header) row. Line
/// breaks inside a cell are shown as spaces.
pub fn render_grid(table: &Table) -> Vec<String> {
    let rows: Vec<Vec<String>> = table
        .text_rows()
        .into_iter()
        .map(|row| row.into_iter().map(|t| t.replace('\n', " ")).collect())
        .collect();

    let widths: Vec<usize> = (0..table.column_count())
        .map(|c| {
            rows.iter()
                .map(|row| row[c].chars().count())
                .max()
                .unwrap_or(0)
                .max(3)
        })
        .collect();

    let separator = format!(
        "    +{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let format_row = |row: &[String]| -> String {
        let cells: String = row
            .iter()
            .zip(&widths)
            .map(|(text, &width)| format!(" {text:<width$} |"))
            .collect();
        format!("    |{cells}")
    };

    let mut lines = vec![separator.clone()];
    for (i, row) in rows.iter().enumerate() {
        lines.push(format_row(row));
        if i == 0 {
            lines.push(separator.clone());
        }
    }
    if rows.len() > 1 {
        lines.push(separator);
    }
    lines
}

/// JSON shape of one table.
pub fn table_json(table: &Table) -> serde_json::Value {
    let bbox = table.bbox();
    serde_json::json!({
        "page": table.page_index() + 1,
        "rows": table.row_count(),
        "columns": table.column_count(),
        "bbox": {
            "x0": bbox.x0,
            "top": bbox.top,
            "x1": bbox.x1,
            "bottom": bbox.bottom,
        },
        "cells": table.text_rows(),
    })
}

/// Print a table's rows as CSV lines.
pub fn print_csv(table: &Table) {
    for row in table.text_rows() {
        let line: Vec<String> = row.iter().map(|t| csv_escape(t)).collect();
        println!("{}", line.join(","));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdftables_core::{Page, TemplateTable, TextRun, Template, apply_template};

    fn make_table(cells: &[(&str, f64, f64)], columns: Vec<f64>, rows: Vec<f64>) -> Table {
        let runs = cells
            .iter()
            .map(|&(text, x, y)| TextRun::new(text, x, y, 5.0, 5.0))
            .collect();
        let page = Page::new(0, 500.0, 500.0, runs).unwrap();
        let template =
            Template::new(vec![TemplateTable::new("T", columns, rows).unwrap().into()]).unwrap();
        apply_template(&template, &page).remove(0)
    }

    #[test]
    fn csv_escape_plain_text() {
        assert_eq!(csv_escape("hello"), "hello");
    }

    #[test]
    fn csv_escape_with_comma() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
    }

    #[test]
    fn csv_escape_with_quotes() {
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_escape_with_newline() {
        assert_eq!(csv_escape("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn load_document_file_not_found() {
        let result = load_document(Path::new("/nonexistent/layout.json"));
        assert_eq!(result.unwrap_err(), 1);
    }

    #[test]
    fn resolve_pages_none_returns_all() {
        assert_eq!(resolve_pages(None, 3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn resolve_pages_invalid_range() {
        assert_eq!(resolve_pages(Some("0"), 5).unwrap_err(), 1);
    }

    #[test]
    fn render_grid_with_header_separator() {
        let table = make_table(
            &[("Name", 1.0, 1.0), ("Qty", 51.0, 1.0), ("Apple", 1.0, 11.0), ("3", 51.0, 11.0)],
            vec![0.0, 50.0, 100.0],
            vec![0.0, 10.0, 20.0],
        );
        assert_eq!(
            render_grid(&table),
            vec![
                "    +-------+-----+",
                "    | Name  | Qty |",
                "    +-------+-----+",
                "    | Apple | 3   |",
                "    +-------+-----+",
            ]
        );
    }

    #[test]
    fn render_grid_single_row() {
        let table = make_table(&[("a", 1.0, 1.0)], vec![0.0, 50.0], vec![0.0, 10.0]);
        assert_eq!(
            render_grid(&table),
            vec!["    +-----+", "    | a   |", "    +-----+"]
        );
    }

    #[test]
    fn table_json_shape() {
        let table = make_table(&[("a", 1.0, 1.0)], vec![0.0, 50.0], vec![0.0, 10.0]);
        let value = table_json(&table);
        assert_eq!(value["page"], 1);
        assert_eq!(value["rows"], 1);
        assert_eq!(value["cells"][0][0], "a");
        assert_eq!(value["bbox"]["x1"], 50.0);
    }
}
