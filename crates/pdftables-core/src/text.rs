use crate::geometry::BBox;

/// A contiguous span of text with a known position on its page.
///
/// Runs are produced by the PDF content provider and never modified by the
/// extractors; tables refer back to them by index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRun {
    /// The text content of this run.
    pub text: String,
    /// Bounding box in top-left origin coordinates.
    pub bbox: BBox,
    /// Index (0-based) of the page the run belongs to.
    pub page_index: usize,
    /// Font size in points.
    pub font_size: f64,
}

impl TextRun {
    /// Create a run from its origin and size. The font size defaults to the run height.
    pub fn new(text: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            bbox: BBox::from_origin_size(x, y, width, height),
            page_index: 0,
            font_size: height,
        }
    }

    /// Set the font size, returning the modified run (builder pattern).
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// The run's origin point: its top-left corner.
    ///
    /// Cell assignment is decided by this point alone.
    pub fn origin(&self) -> (f64, f64) {
        (self.bbox.x0, self.bbox.top)
    }

    /// Baseline y-coordinate, approximated by the bottom edge.
    pub fn baseline(&self) -> f64 {
        self.bbox.bottom
    }

    /// Number of characters in the run.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Average width of one character, or `None` for an empty run.
    pub fn char_width(&self) -> Option<f64> {
        match self.char_count() {
            0 => None,
            n => Some(self.bbox.width() / n as f64),
        }
    }

    /// Returns `true` if the run carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Median of a list of values. Returns `None` for an empty list.
pub(crate) fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
