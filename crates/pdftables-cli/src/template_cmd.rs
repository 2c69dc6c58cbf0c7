use std::path::Path;

use pdftables_core::{
    Document, ExtractedField, FieldValue, Template, TemplateExtractor, load_template_file,
};

use crate::cli::OutputFormat;
use crate::shared::{csv_escape, load_document, print_csv, render_grid, resolve_pages, table_json};

pub fn run(
    file: &Path,
    template_file: &Path,
    pages: Option<&str>,
    format: &OutputFormat,
) -> Result<(), i32> {
    let document = load_document(file)?;
    let page_indices = resolve_pages(pages, document.page_count())?;

    if !template_file.exists() {
        eprintln!("Error: template file not found: {}", template_file.display());
        return Err(1);
    }
    // Skipped items are reported through the log
    let template = load_template_file(template_file)
        .map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?
        .value;

    let fields = evaluate(&template, &document, pages, &page_indices);

    match format {
        OutputFormat::Text => write_text(&fields, document.page_count()),
        OutputFormat::Json => write_json(&fields),
        OutputFormat::Csv => write_csv(&fields),
    }
}

fn evaluate(
    template: &Template,
    document: &Document,
    pages: Option<&str>,
    page_indices: &[usize],
) -> Vec<ExtractedField> {
    let extractor = TemplateExtractor::default();
    if pages.is_none() {
        return extractor.parse_document(template, document);
    }
    page_indices
        .iter()
        .filter_map(|&idx| document.page(idx))
        .flat_map(|page| extractor.parse_page(template, page))
        .collect()
}

fn write_text(fields: &[ExtractedField], page_count: usize) -> Result<(), i32> {
    println!("Total pages: {page_count}");
    println!();

    if fields.iter().all(|f| f.as_table().is_none()) {
        println!("No tables found using the template.");
        return Ok(());
    }

    // Fields arrive grouped by page already
    for chunk in fields.chunk_by(|a, b| a.page_index == b.page_index) {
        println!("Tables in the Page {}", chunk[0].page_index + 1);
        println!();
        let mut table_num = 0;
        for field in chunk {
            match field.value {
                FieldValue::Table(ref table) => {
                    table_num += 1;
                    println!(
                        "  Table {table_num} (Field: {}): {} rows x {} columns",
                        field.name,
                        table.row_count(),
                        table.column_count()
                    );
                    for line in render_grid(table) {
                        println!("{line}");
                    }
                }
                FieldValue::Text(ref value) => {
                    println!("  {}: {}", field.name, value.as_deref().unwrap_or("(not found)"));
                }
            }
        }
        println!();
    }

    Ok(())
}

fn field_json(field: &ExtractedField) -> serde_json::Value {
    match field.value {
        FieldValue::Table(ref table) => serde_json::json!({
            "name": field.name,
            "page": field.page_index + 1,
            "kind": "table",
            "table": table_json(table),
        }),
        FieldValue::Text(ref value) => serde_json::json!({
            "name": field.name,
            "page": field.page_index + 1,
            "kind": "text",
            "value": value,
        }),
    }
}

fn write_json(fields: &[ExtractedField]) -> Result<(), i32> {
    let all: Vec<serde_json::Value> = fields.iter().map(field_json).collect();
    let json_str = serde_json::to_string(&all).map_err(|e| {
        eprintln!("Error: failed to serialize fields: {e}");
        1
    })?;
    println!("{json_str}");
    Ok(())
}

fn write_csv(fields: &[ExtractedField]) -> Result<(), i32> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            println!();
        }
        match field.value {
            FieldValue::Table(ref table) => {
                println!("# {} (page {})", field.name, field.page_index + 1);
                print_csv(table);
            }
            FieldValue::Text(ref value) => {
                println!(
                    "{},{}",
                    csv_escape(&field.name),
                    csv_escape(value.as_deref().unwrap_or(""))
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdftables_core::{FieldRule, Page, TemplateField, TemplateTable, TextRun};

    fn make_document() -> Document {
        let page = |index| {
            Page::new(
                index,
                200.0,
                200.0,
                vec![TextRun::new("Total: 5", 10.0, 10.0, 40.0, 10.0)],
            )
            .unwrap()
        };
        Document::new(vec![page(0), page(1)]).unwrap()
    }

    fn make_template() -> Template {
        Template::new(vec![
            TemplateTable::new("Box", vec![0.0, 100.0], vec![0.0, 50.0])
                .unwrap()
                .on_page(1)
                .into(),
            TemplateField::new("Total", FieldRule::Label("Total:".to_string())).into(),
        ])
        .unwrap()
    }

    #[test]
    fn evaluate_all_pages() {
        let fields = evaluate(&make_template(), &make_document(), None, &[0, 1]);
        let names: Vec<(&str, usize)> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.page_index))
            .collect();
        assert_eq!(names, vec![("Total", 0), ("Box", 1), ("Total", 1)]);
    }

    #[test]
    fn evaluate_selected_pages() {
        let fields = evaluate(&make_template(), &make_document(), Some("2"), &[1]);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].as_table().and_then(|t| t.text(0, 0)), Some("Total: 5"));
        assert_eq!(fields[1].as_text(), Some("5"));
    }

    #[test]
    fn field_json_shapes() {
        let fields = evaluate(&make_template(), &make_document(), Some("2"), &[1]);
        let table = field_json(&fields[0]);
        assert_eq!(table["kind"], "table");
        assert_eq!(table["page"], 2);
        assert_eq!(table["table"]["cells"][0][0], "Total: 5");
        let text = field_json(&fields[1]);
        assert_eq!(text["kind"], "text");
        assert_eq!(text["value"], "5");
    }
}
