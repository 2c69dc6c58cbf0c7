//! Table grid construction from rulings.
//!
//! Pipeline: snap near-equal parallel rulings, join collinear segments, link
//! crossing rulings into connected regions, then keep the rulings that close
//! each region as its row and column boundaries.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::LayoutIssue;
use crate::geometry::{BBox, Orientation};
use crate::ruling::{RulingSegment, first_wins};
use crate::settings::ExtractionSettings;

/// Column and row boundaries of one table.
///
/// Both sequences are finite, strictly increasing and hold at least two
/// entries; `n + 1` boundaries describe `n` columns (or rows).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TableGrid {
    columns: Vec<f64>,
    rows: Vec<f64>,
}

/// Check that `positions` can serve as the boundaries of one grid axis.
pub(crate) fn validate_positions(
    orientation: Orientation,
    positions: &[f64],
) -> Result<(), LayoutIssue> {
    let axis = orientation.axis_name();
    if positions.len() < 2 {
        return Err(LayoutIssue::TooFewBoundaries {
            axis,
            count: positions.len(),
        });
    }
    if let Some(index) = positions.iter().position(|p| !p.is_finite()) {
        return Err(LayoutIssue::NonFinite { axis, index });
    }
    if let Some(index) = (1..positions.len()).find(|&i| positions[i] <= positions[i - 1]) {
        return Err(LayoutIssue::NotIncreasing {
            axis,
            index,
            value: positions[index],
        });
    }
    Ok(())
}

impl TableGrid {
    /// Create a grid, validating both boundary sequences.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutIssue`] if either axis has fewer than two
    /// boundaries, a non-finite boundary, or is not strictly increasing.
    pub fn new(columns: Vec<f64>, rows: Vec<f64>) -> Result<Self, LayoutIssue> {
        // Column boundaries are x-positions, i.e. the positions of vertical rulings
        validate_positions(Orientation::Vertical, &columns)?;
        validate_positions(Orientation::Horizontal, &rows)?;
        Ok(Self { columns, rows })
    }

    /// Column boundaries (x-positions).
    pub fn columns(&self) -> &[f64] {
        &self.columns
    }

    /// Row boundaries (y-positions).
    pub fn rows(&self) -> &[f64] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len() - 1
    }

    pub fn row_count(&self) -> usize {
        self.rows.len() - 1
    }

    /// Area covered by the grid.
    pub fn bbox(&self) -> BBox {
        BBox::new(
            self.columns[0],
            self.rows[0],
            self.columns[self.columns.len() - 1],
            self.rows[self.rows.len() - 1],
        )
    }

    /// Rectangle of cell `(row, col)`, or `None` when out of range.
    pub fn cell_bbox(&self, row: usize, col: usize) -> Option<BBox> {
        if row >= self.row_count() || col >= self.column_count() {
            return None;
        }
        Some(BBox::new(
            self.columns[col],
            self.rows[row],
            self.columns[col + 1],
            self.rows[row + 1],
        ))
    }

    /// Column index of `x`, using half-open intervals `[cols[c], cols[c+1])`.
    pub fn column_of(&self, x: f64) -> Option<usize> {
        locate(&self.columns, x)
    }

    /// Row index of `y`, using half-open intervals `[rows[r], rows[r+1])`.
    pub fn row_of(&self, y: f64) -> Option<usize> {
        locate(&self.rows, y)
    }

    /// Drop the boundaries listed in `columns` and `rows` (interior indices only).
    pub(crate) fn without_boundaries(&self, columns: &[usize], rows: &[usize]) -> Self {
        let keep = |bounds: &[f64], dropped: &[usize]| -> Vec<f64> {
            bounds
                .iter()
                .enumerate()
                .filter(|(i, _)| *i == 0 || *i == bounds.len() - 1 || !dropped.contains(i))
                .map(|(_, v)| *v)
                .collect()
        };
        Self {
            columns: keep(&self.columns, columns),
            rows: keep(&self.rows, rows),
        }
    }
}

/// Index `i` with `bounds[i] <= v < bounds[i + 1]`.
fn locate(bounds: &[f64], v: f64) -> Option<usize> {
    let (first, last) = (*bounds.first()?, *bounds.last()?);
    if !(v >= first && v < last) {
        return None;
    }
    Some(bounds.partition_point(|b| *b <= v) - 1)
}

/// Snap parallel rulings whose positions lie within `tolerance` of the first
/// ruling of their cluster to that first position.
///
/// Only positions change; segments are not merged here.
pub fn snap_rulings(rulings: Vec<RulingSegment>, tolerance: f64) -> Vec<RulingSegment> {
    let (mut horizontals, mut verticals): (Vec<_>, Vec<_>) = rulings
        .into_iter()
        .partition(|r| r.orientation == Orientation::Horizontal);
    snap_group(&mut horizontals, tolerance);
    snap_group(&mut verticals, tolerance);
    horizontals.extend(verticals);
    horizontals
}

fn snap_group(rulings: &mut [RulingSegment], tolerance: f64) {
    if rulings.is_empty() {
        return;
    }

    // Stable sort keeps detection order among equal positions
    rulings.sort_by(|a, b| a.position.total_cmp(&b.position));

    let mut anchor = rulings[0].position;
    for ruling in rulings.iter_mut() {
        if ruling.position - anchor > tolerance {
            anchor = ruling.position;
        }
        ruling.position = anchor;
    }
}

/// Merge collinear rulings whose extents overlap or are within `tolerance`.
pub fn join_rulings(rulings: Vec<RulingSegment>, tolerance: f64) -> Vec<RulingSegment> {
    let (horizontals, verticals): (Vec<_>, Vec<_>) = rulings
        .into_iter()
        .partition(|r| r.orientation == Orientation::Horizontal);
    let mut result = join_collinear(horizontals, tolerance);
    result.extend(join_collinear(verticals, tolerance));
    result
}

fn join_collinear(mut rulings: Vec<RulingSegment>, tolerance: f64) -> Vec<RulingSegment> {
    rulings.sort_by(|a, b| {
        a.position
            .total_cmp(&b.position)
            .then_with(|| a.start.total_cmp(&b.start))
    });

    let mut result: Vec<RulingSegment> = Vec::with_capacity(rulings.len());
    for ruling in rulings {
        match result.last_mut() {
            // Positions are exact after snapping
            Some(current)
                if current.position == ruling.position
                    && ruling.start <= current.end + tolerance =>
            {
                current.end = current.end.max(ruling.end);
            }
            _ => result.push(ruling),
        }
    }
    result
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]]; // path compression
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Lower root wins so component order follows detection order
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

/// Returns `true` if a horizontal and a vertical ruling cross (or nearly touch).
fn crosses(h: &RulingSegment, v: &RulingSegment, tolerance: f64) -> bool {
    v.position >= h.start - tolerance
        && v.position <= h.end + tolerance
        && h.position >= v.start - tolerance
        && h.position <= v.end + tolerance
}

/// Boundaries closing a region: rulings spanning `from..to` within `tolerance`.
fn closing_positions(
    rulings: &[&RulingSegment],
    from: f64,
    to: f64,
    tolerance: f64,
    merge_tolerance: f64,
) -> Vec<f64> {
    let mut positions: Vec<f64> = rulings
        .iter()
        .filter(|r| r.start <= from + tolerance && r.end >= to - tolerance)
        .map(|r| r.position)
        .collect();
    positions.sort_by(f64::total_cmp);
    first_wins(&positions, merge_tolerance)
}

/// Build table grids from rulings.
///
/// Each connected set of crossing rulings with at least two horizontal and two
/// vertical members is a candidate region. Joining and crossing use
/// `merge_tolerance`, so tables a couple of points apart stay separate. Rulings that span the whole region
/// become its boundaries; a region left with fewer than two boundaries on
/// either axis is discarded. Grids come back top-to-bottom, then
/// left-to-right.
pub fn build_grids(rulings: &[RulingSegment], settings: &ExtractionSettings) -> Vec<TableGrid> {
    let snapped = snap_rulings(rulings.to_vec(), settings.merge_tolerance);
    let joined = join_rulings(snapped, settings.merge_tolerance);

    let (horizontals, verticals): (Vec<&RulingSegment>, Vec<&RulingSegment>) = joined
        .iter()
        .partition(|r| r.orientation == Orientation::Horizontal);
    if horizontals.len() < 2 || verticals.len() < 2 {
        return Vec::new();
    }

    // Union-Find over horizontals (0..nh) followed by verticals (nh..)
    let nh = horizontals.len();
    let mut parent: Vec<usize> = (0..nh + verticals.len()).collect();
    for (i, h) in horizontals.iter().enumerate() {
        for (j, v) in verticals.iter().enumerate() {
            if crosses(h, v, settings.merge_tolerance) {
                union(&mut parent, i, nh + j);
            }
        }
    }

    let mut components: BTreeMap<usize, (Vec<&RulingSegment>, Vec<&RulingSegment>)> =
        BTreeMap::new();
    for i in 0..parent.len() {
        let root = find(&mut parent, i);
        let entry = components.entry(root).or_default();
        if i < nh {
            entry.0.push(horizontals[i]);
        } else {
            entry.1.push(verticals[i - nh]);
        }
    }

    let mut grids: Vec<TableGrid> = Vec::new();
    for (hs, vs) in components.into_values() {
        if hs.len() < 2 || vs.len() < 2 {
            continue;
        }
        let left = vs.iter().map(|r| r.position).fold(f64::INFINITY, f64::min);
        let right = vs.iter().map(|r| r.position).fold(f64::NEG_INFINITY, f64::max);
        let top = hs.iter().map(|r| r.position).fold(f64::INFINITY, f64::min);
        let bottom = hs.iter().map(|r| r.position).fold(f64::NEG_INFINITY, f64::max);

        let rows = closing_positions(
            &hs,
            left,
            right,
            settings.span_tolerance,
            settings.merge_tolerance,
        );
        let columns = closing_positions(
            &vs,
            top,
            bottom,
            settings.span_tolerance,
            settings.merge_tolerance,
        );
        match TableGrid::new(columns, rows) {
            Ok(grid) => grids.push(grid),
            Err(issue) => debug!(%issue, "discarding ruled region"),
        }
    }

    grids.sort_by(|a, b| {
        a.rows[0]
            .total_cmp(&b.rows[0])
            .then_with(|| a.columns[0].total_cmp(&b.columns[0]))
    });
    debug!(rulings = rulings.len(), grids = grids.len(), "built table grids");
    grids
}
