//! Tables and automatic table extraction.
//!
//! [`TableExtractor`] runs ruling detection and grid building on each page,
//! then assigns the page's text runs to the cells of every grid. The same
//! assignment ([`build_table`]) backs template-driven extraction, so both
//! paths produce identical [`Table`] values.

use std::collections::BTreeMap;
use std::ops::Index;

use tracing::debug;

use crate::geometry::BBox;
use crate::grid::{TableGrid, build_grids};
use crate::page::{Document, Page};
use crate::ruling::detect_rulings;
use crate::settings::ExtractionSettings;
use crate::text::TextRun;

/// A single cell of a table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cell {
    /// Row index (0-based).
    pub row: usize,
    /// Column index (0-based).
    pub col: usize,
    /// Cell rectangle.
    pub bbox: BBox,
    /// Indices of the assigned runs in the page's run list.
    pub run_indices: Vec<usize>,
    /// Text of the assigned runs, in reading order.
    pub text: String,
}

impl Cell {
    /// Returns `true` if the cell holds no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A detected or template-defined table.
///
/// Cells are stored row-major with exactly one cell per `(row, col)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Table {
    page_index: usize,
    bbox: BBox,
    row_count: usize,
    column_count: usize,
    cells: Vec<Cell>,
}

impl Table {
    /// Index of the page the table was found on.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Area covered by the table.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at `(row, col)`, or `None` when out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row >= self.row_count || col >= self.column_count {
            return None;
        }
        self.cells.get(row * self.column_count + col)
    }

    /// Text of cell `(row, col)`.
    pub fn text(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).map(|c| c.text.as_str())
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.column_count)
    }

    /// Cell texts as a row-major matrix.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows()
            .map(|row| row.iter().map(|c| c.text.clone()).collect())
            .collect()
    }

    /// Returns `true` if no cell holds text.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}

impl Index<(usize, usize)> for Table {
    type Output = Cell;

    fn index(&self, (row, col): (usize, usize)) -> &Cell {
        match self.cell(row, col) {
            Some(cell) => cell,
            None => panic!(
                "cell ({row}, {col}) out of bounds for a {}x{} table",
                self.row_count, self.column_count
            ),
        }
    }
}

/// Assign runs to the cells of `grid` by their origin point.
///
/// Returns one list of run indices per cell, row-major. A run belongs to
/// column `c` iff `cols[c] <= x < cols[c + 1]` (rows likewise), so a run on a
/// shared boundary lands in the right/lower cell and a run on the outer
/// right/bottom boundary is left out.
pub fn assign_runs(grid: &TableGrid, runs: &[TextRun]) -> Vec<Vec<usize>> {
    let mut assigned = vec![Vec::new(); grid.row_count() * grid.column_count()];
    for (i, run) in runs.iter().enumerate() {
        let (x, y) = run.origin();
        if let (Some(row), Some(col)) = (grid.row_of(y), grid.column_of(x)) {
            assigned[row * grid.column_count() + col].push(i);
        }
    }
    assigned
}

/// Group runs into visual lines: sorted top-to-bottom then left-to-right, a
/// run joins the current line when its top is within `tolerance` of the
/// line's first run.
pub(crate) fn group_lines<'a>(mut runs: Vec<&'a TextRun>, tolerance: f64) -> Vec<Vec<&'a TextRun>> {
    runs.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut lines: Vec<Vec<&TextRun>> = Vec::new();
    for run in runs {
        match lines.last_mut() {
            Some(line) if run.bbox.top - line[0].bbox.top <= tolerance => line.push(run),
            _ => lines.push(vec![run]),
        }
    }
    for line in &mut lines {
        line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    lines
}

/// Join the text of one line of runs, skipping blank runs.
pub(crate) fn line_text(line: &[&TextRun], settings: &ExtractionSettings) -> String {
    line.iter()
        .map(|r| r.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(&settings.word_separator)
}

/// Text of a set of runs in reading order.
pub(crate) fn runs_text(runs: Vec<&TextRun>, settings: &ExtractionSettings) -> String {
    group_lines(runs, settings.tie_tolerance)
        .iter()
        .map(|line| line_text(line, settings))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(&settings.line_separator)
}

/// Build the table for `grid` from the runs of `page`.
pub fn build_table(grid: &TableGrid, page: &Page, settings: &ExtractionSettings) -> Table {
    let runs = page.runs();
    let assigned = assign_runs(grid, runs);
    let column_count = grid.column_count();

    let cells = assigned
        .into_iter()
        .enumerate()
        .map(|(i, run_indices)| {
            let (row, col) = (i / column_count, i % column_count);
            let text = runs_text(run_indices.iter().map(|&r| &runs[r]).collect(), settings);
            Cell {
                row,
                col,
                bbox: grid
                    .cell_bbox(row, col)
                    .unwrap_or_else(|| grid.bbox()),
                run_indices,
                text,
            }
        })
        .collect();

    Table {
        page_index: page.index(),
        bbox: grid.bbox(),
        row_count: grid.row_count(),
        column_count,
        cells,
    }
}

/// Interior boundaries separating two adjacent empty lanes.
fn redundant_boundaries(empty: &[bool]) -> Vec<usize> {
    (1..empty.len())
        .filter(|&i| empty[i - 1] && empty[i])
        .collect()
}

/// Collapse runs of adjacent empty rows and/or columns according to
/// `settings.merge_empty`.
fn collapse_empty(grid: TableGrid, table: Table, page: &Page, settings: &ExtractionSettings) -> Table {
    let policy = settings.merge_empty;
    let rows: Vec<usize> = if policy.merges_rows() {
        let empty: Vec<bool> = table.rows().map(|r| r.iter().all(Cell::is_empty)).collect();
        redundant_boundaries(&empty)
    } else {
        Vec::new()
    };
    let columns: Vec<usize> = if policy.merges_columns() {
        let empty: Vec<bool> = (0..table.column_count)
            .map(|c| (0..table.row_count).all(|r| table[(r, c)].is_empty()))
            .collect();
        redundant_boundaries(&empty)
    } else {
        Vec::new()
    };

    if rows.is_empty() && columns.is_empty() {
        return table;
    }
    debug!(
        rows = rows.len(),
        columns = columns.len(),
        "collapsing empty rows/columns"
    );
    build_table(&grid.without_boundaries(&columns, &rows), page, settings)
}

/// Automatic table extraction.
#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    settings: ExtractionSettings,
}

impl TableExtractor {
    /// Create an extractor with the given settings.
    pub fn new(settings: ExtractionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Find all tables on a page, top-to-bottom then left-to-right.
    ///
    /// Returns an empty list when the page has no tabular content.
    pub fn extract_page(&self, page: &Page) -> Vec<Table> {
        let rulings = detect_rulings(page, &self.settings);
        let grids = build_grids(&rulings, &self.settings);
        debug!(page = page.index(), tables = grids.len(), "extracted tables");

        grids
            .into_iter()
            .map(|grid| {
                let table = build_table(&grid, page, &self.settings);
                collapse_empty(grid, table, page, &self.settings)
            })
            .collect()
    }

    /// Find all tables of a document, in page order.
    pub fn extract_document(&self, document: &Document) -> Vec<Table> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let per_page: Vec<Vec<Table>> = document
                .pages()
                .par_iter()
                .map(|page| self.extract_page(page))
                .collect();
            per_page.into_iter().flatten().collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            document
                .pages()
                .iter()
                .flat_map(|page| self.extract_page(page))
                .collect()
        }
    }
}

/// Extract the tables of one page with default settings.
pub fn extract_tables(page: &Page) -> Vec<Table> {
    TableExtractor::default().extract_page(page)
}

/// Extract the tables of a document with default settings.
pub fn extract_document_tables(document: &Document) -> Vec<Table> {
    TableExtractor::default().extract_document(document)
}

/// Group tables by page index, preserving their relative order.
///
/// Pages come back in ascending index order.
pub fn group_by_page(tables: &[Table]) -> Vec<(usize, Vec<&Table>)> {
    let mut groups: BTreeMap<usize, Vec<&Table>> = BTreeMap::new();
    for table in tables {
        groups.entry(table.page_index).or_default().push(table);
    }
    groups.into_iter().collect()
}
