//! Ruling detection: candidate table separators for a page.
//!
//! Rulings come either from drawn lines and rectangle sides, or, when those
//! cannot bound even a single cell, from whitespace gaps in the text layout.

use tracing::debug;

use crate::geometry::Orientation;
use crate::page::Page;
use crate::settings::{ExtractionSettings, Strategy};
use crate::shapes::{Line, Rect};
use crate::text::{TextRun, median};

/// Where a ruling was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulingSource {
    /// Derived directly from a drawn line.
    Line,
    /// Top side of a rectangle.
    RectTop,
    /// Bottom side of a rectangle.
    RectBottom,
    /// Left side of a rectangle.
    RectLeft,
    /// Right side of a rectangle.
    RectRight,
    /// Inferred from a whitespace gap between text runs.
    Whitespace,
}

impl RulingSource {
    /// Returns `true` for rulings that were actually drawn on the page.
    pub fn is_drawn(self) -> bool {
        self != RulingSource::Whitespace
    }
}

/// A horizontal or vertical separator candidate.
///
/// `position` is the y-coordinate of a horizontal ruling or the x-coordinate
/// of a vertical one; `start..end` is its extent along the other axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RulingSegment {
    pub orientation: Orientation,
    pub position: f64,
    pub start: f64,
    pub end: f64,
    pub source: RulingSource,
}

impl RulingSegment {
    /// Horizontal ruling at `y` spanning `x0..x1`.
    pub fn horizontal(y: f64, x0: f64, x1: f64, source: RulingSource) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            position: y,
            start: x0.min(x1),
            end: x0.max(x1),
            source,
        }
    }

    /// Vertical ruling at `x` spanning `top..bottom`.
    pub fn vertical(x: f64, top: f64, bottom: f64, source: RulingSource) -> Self {
        Self {
            orientation: Orientation::Vertical,
            position: x,
            start: top.min(bottom),
            end: top.max(bottom),
            source,
        }
    }

    /// Length of the ruling along its own axis.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Derive a ruling from a drawn line. Diagonal lines yield `None`.
pub fn ruling_from_line(line: &Line) -> Option<RulingSegment> {
    match line.orientation()? {
        Orientation::Horizontal => Some(RulingSegment::horizontal(
            line.top,
            line.x0,
            line.x1,
            RulingSource::Line,
        )),
        Orientation::Vertical => Some(RulingSegment::vertical(
            line.x0,
            line.top,
            line.bottom,
            RulingSource::Line,
        )),
    }
}

/// Derive the 4 rulings of a rectangle (top, bottom, left, right).
pub fn rulings_from_rect(rect: &Rect) -> [RulingSegment; 4] {
    [
        RulingSegment::horizontal(rect.top, rect.x0, rect.x1, RulingSource::RectTop),
        RulingSegment::horizontal(rect.bottom, rect.x0, rect.x1, RulingSource::RectBottom),
        RulingSegment::vertical(rect.x0, rect.top, rect.bottom, RulingSource::RectLeft),
        RulingSegment::vertical(rect.x1, rect.top, rect.bottom, RulingSource::RectRight),
    ]
}

/// Collect rulings from the page's drawn primitives, dropping segments
/// shorter than `min_length`.
pub fn drawn_rulings(page: &Page, min_length: f64) -> Vec<RulingSegment> {
    let mut rulings: Vec<RulingSegment> = page.lines().iter().filter_map(ruling_from_line).collect();
    for rect in page.rects() {
        rulings.extend(rulings_from_rect(rect));
    }
    rulings.retain(|r| r.length() >= min_length);
    rulings
}

/// Returns `true` if the rulings contain at least 2 horizontal and 2 vertical ones.
fn can_bound_cell(rulings: &[RulingSegment]) -> bool {
    let horizontal = rulings
        .iter()
        .filter(|r| r.orientation == Orientation::Horizontal)
        .count();
    let vertical = rulings.len() - horizontal;
    horizontal >= 2 && vertical >= 2
}

/// Detect the rulings of a page according to `settings.strategy`.
///
/// Returns an empty list for pages without tabular content.
pub fn detect_rulings(page: &Page, settings: &ExtractionSettings) -> Vec<RulingSegment> {
    match settings.strategy {
        Strategy::Ruled => drawn_rulings(page, settings.min_ruling_length),
        Strategy::Whitespace => infer_rulings(page.runs(), settings),
        Strategy::Auto => {
            let drawn = drawn_rulings(page, settings.min_ruling_length);
            if can_bound_cell(&drawn) {
                drawn
            } else {
                debug!(
                    page = page.index(),
                    drawn = drawn.len(),
                    "too few drawn rulings, inferring from whitespace"
                );
                infer_rulings(page.runs(), settings)
            }
        }
    }
}

/// Keep positions that lie more than `tolerance` beyond the last kept one.
///
/// Input must be sorted ascending; among near-equal candidates the first
/// (left-/top-most) survives.
pub(crate) fn first_wins(positions: &[f64], tolerance: f64) -> Vec<f64> {
    let mut kept: Vec<f64> = Vec::with_capacity(positions.len());
    for &p in positions {
        match kept.last() {
            Some(&last) if p - last <= tolerance => {}
            _ => kept.push(p),
        }
    }
    kept
}

/// Column boundaries from whitespace gaps in the runs' x-projection.
fn column_boundaries(runs: &[&TextRun], min_gap: f64, tolerance: f64) -> Vec<f64> {
    let mut spans: Vec<(f64, f64)> = runs.iter().map(|r| (r.bbox.x0, r.bbox.x1)).collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    // Merge overlapping projections into occupied spans
    let mut occupied: Vec<(f64, f64)> = Vec::new();
    for (start, end) in spans {
        match occupied.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => occupied.push((start, end)),
        }
    }

    let (Some(first), Some(last)) = (occupied.first(), occupied.last()) else {
        return Vec::new();
    };
    let mut candidates = vec![first.0];
    for pair in occupied.windows(2) {
        let gap = pair[1].0 - pair[0].1;
        if gap > min_gap {
            candidates.push((pair[0].1 + pair[1].0) / 2.0);
        }
    }
    candidates.push(last.1);
    first_wins(&candidates, tolerance)
}

/// A text line: runs whose baselines cluster together.
struct TextLine {
    baseline: f64,
    top: f64,
    bottom: f64,
}

/// Row boundaries from text line baselines.
fn row_boundaries(runs: &[&TextRun], tolerance: f64) -> Vec<f64> {
    let mut sorted: Vec<&TextRun> = runs.to_vec();
    sorted.sort_by(|a, b| a.baseline().total_cmp(&b.baseline()));

    let mut lines: Vec<TextLine> = Vec::new();
    for run in sorted {
        match lines.last_mut() {
            Some(line) if run.baseline() - line.baseline <= tolerance => {
                line.top = line.top.min(run.bbox.top);
                line.bottom = line.bottom.max(run.bbox.bottom);
            }
            _ => lines.push(TextLine {
                baseline: run.baseline(),
                top: run.bbox.top,
                bottom: run.bbox.bottom,
            }),
        }
    }

    let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
        return Vec::new();
    };
    let outer_top = lines.iter().map(|l| l.top).fold(first.top, f64::min);
    let outer_bottom = lines.iter().map(|l| l.bottom).fold(last.bottom, f64::max);

    let mut candidates = vec![outer_top];
    for pair in lines.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        let boundary = if lower.top >= upper.bottom {
            (upper.bottom + lower.top) / 2.0
        } else {
            lower.top
        };
        candidates.push(boundary);
    }
    candidates.push(outer_bottom);
    candidates.sort_by(f64::total_cmp);
    first_wins(&candidates, tolerance)
}

/// Infer rulings from whitespace alignment of the text runs.
///
/// Gaps in the x-projection wider than `gap_multiplier` x the median
/// character width become column boundaries; every baseline cluster becomes
/// a row. The rulings produced all span the full inferred area, so they form
/// a single grid. Nothing is returned when fewer than `min_inferred_columns`
/// columns or `min_inferred_rows` rows result.
pub fn infer_rulings(runs: &[TextRun], settings: &ExtractionSettings) -> Vec<RulingSegment> {
    let runs: Vec<&TextRun> = runs.iter().filter(|r| !r.is_blank()).collect();
    if runs.len() < 2 {
        return Vec::new();
    }

    let mut widths: Vec<f64> = runs
        .iter()
        .filter_map(|r| r.char_width())
        .filter(|w| *w > 0.0)
        .collect();
    let Some(char_width) = median(&mut widths) else {
        return Vec::new();
    };
    let min_gap = settings.gap_multiplier * char_width;

    let columns = column_boundaries(&runs, min_gap, settings.tie_tolerance);
    let rows = row_boundaries(&runs, settings.tie_tolerance);

    let column_count = columns.len().saturating_sub(1);
    let row_count = rows.len().saturating_sub(1);
    if column_count < settings.min_inferred_columns.max(1)
        || row_count < settings.min_inferred_rows.max(1)
    {
        debug!(column_count, row_count, "whitespace layout is not tabular");
        return Vec::new();
    }

    let (left, right) = (columns[0], columns[column_count]);
    let (top, bottom) = (rows[0], rows[row_count]);

    let mut rulings = Vec::with_capacity(columns.len() + rows.len());
    for &y in &rows {
        rulings.push(RulingSegment::horizontal(y, left, right, RulingSource::Whitespace));
    }
    for &x in &columns {
        rulings.push(RulingSegment::vertical(x, top, bottom, RulingSource::Whitespace));
    }
    debug!(column_count, row_count, min_gap, "inferred whitespace rulings");
    rulings
}
