//! Page and document types: the input boundary of the engine.
//!
//! A content provider hands over positioned text runs (and optionally the
//! drawn lines and rectangles of the page). Everything is validated once
//! here so the extractors can treat their input as well-formed.

use crate::error::{Error, Result};
use crate::geometry::BBox;
use crate::shapes::{Line, Rect};
use crate::text::TextRun;

/// A single page of positioned content.
///
/// Immutable once built. Construct with [`Page::new`] or
/// [`Page::with_geometry`], both of which reject inconsistent data.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page index (0-based).
    index: usize,
    /// Page width in points.
    width: f64,
    /// Page height in points.
    height: f64,
    /// Text runs in content order.
    runs: Vec<TextRun>,
    /// Drawn line segments.
    lines: Vec<Line>,
    /// Drawn rectangles.
    rects: Vec<Rect>,
}

impl Page {
    /// Create a page holding only text runs.
    pub fn new(index: usize, width: f64, height: f64, runs: Vec<TextRun>) -> Result<Self> {
        Self::with_geometry(index, width, height, runs, Vec::new(), Vec::new())
    }

    /// Create a page with text runs and vector primitives.
    ///
    /// Every run is tagged with `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPage`] when the page size is not positive and
    /// finite, a run has a non-finite box or a negative width/height, or a
    /// line/rectangle has non-finite coordinates.
    pub fn with_geometry(
        index: usize,
        width: f64,
        height: f64,
        mut runs: Vec<TextRun>,
        lines: Vec<Line>,
        rects: Vec<Rect>,
    ) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedPage {
            page: index,
            reason,
        };

        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(malformed(format!(
                "page size {width} x {height} is not positive"
            )));
        }

        for (i, run) in runs.iter_mut().enumerate() {
            if !run.bbox.is_finite() {
                return Err(malformed(format!("run #{i} has a non-finite bounding box")));
            }
            if run.bbox.width() < 0.0 {
                return Err(malformed(format!("run #{i} has negative width")));
            }
            if run.bbox.height() < 0.0 {
                return Err(malformed(format!("run #{i} has negative height")));
            }
            if !run.font_size.is_finite() || run.font_size < 0.0 {
                return Err(malformed(format!("run #{i} has an invalid font size")));
            }
            run.page_index = index;
        }

        if let Some(i) = lines.iter().position(|l| !l.is_finite()) {
            return Err(malformed(format!("line #{i} has non-finite coordinates")));
        }
        for (i, rect) in rects.iter().enumerate() {
            let bbox = rect.bbox();
            if !bbox.is_finite() || bbox.width() < 0.0 || bbox.height() < 0.0 {
                return Err(malformed(format!("rect #{i} is not a valid rectangle")));
            }
        }

        Ok(Self {
            index,
            width,
            height,
            runs,
            lines,
            rects,
        })
    }

    /// Returns the page index (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the page width in points.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the page height in points.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The page rectangle.
    pub fn bbox(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }

    /// Returns the text runs of this page.
    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Returns the drawn lines of this page.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Returns the drawn rectangles of this page.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }
}

/// An ordered sequence of pages; page `i` carries index `i`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    /// # Errors
    ///
    /// Returns [`Error::MalformedPage`] if a page's index does not match its position.
    pub fn new(pages: Vec<Page>) -> Result<Self> {
        if let Some((pos, page)) = pages.iter().enumerate().find(|(i, p)| p.index() != *i) {
            return Err(Error::MalformedPage {
                page: page.index(),
                reason: format!("page found at position {pos} of the document"),
            });
        }
        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Serialisable shape of one text run as emitted by a content provider.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunLayout {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub font_size: Option<f64>,
}

/// Serialisable shape of one page as emitted by a content provider.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageLayout {
    /// Explicit page index; defaults to the page's position in the document.
    #[cfg_attr(feature = "serde", serde(default))]
    pub index: Option<usize>,
    pub width: f64,
    pub height: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub runs: Vec<RunLayout>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub lines: Vec<Line>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rects: Vec<Rect>,
}

/// Serialisable shape of a whole document.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

impl PageLayout {
    /// Validate into a [`Page`], using `default_index` when no index is given.
    pub fn into_page(self, default_index: usize) -> Result<Page> {
        let index = self.index.unwrap_or(default_index);
        let runs = self
            .runs
            .into_iter()
            .map(|r| {
                let run = TextRun::new(r.text, r.x, r.y, r.width, r.height);
                match r.font_size {
                    Some(size) => run.with_font_size(size),
                    None => run,
                }
            })
            .collect();
        Page::with_geometry(index, self.width, self.height, runs, self.lines, self.rects)
    }
}

impl TryFrom<PageLayout> for Page {
    type Error = Error;

    fn try_from(layout: PageLayout) -> Result<Self> {
        layout.into_page(0)
    }
}

impl TryFrom<DocumentLayout> for Document {
    type Error = Error;

    fn try_from(layout: DocumentLayout) -> Result<Self> {
        let pages = layout
            .pages
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.into_page(i))
            .collect::<Result<Vec<_>>>()?;
        Document::new(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_run(text: &str, x: f64, y: f64) -> TextRun {
        TextRun::new(text, x, y, 10.0, 8.0)
    }

    #[test]
    fn test_page_tags_runs_with_index() {
        let page = Page::new(4, 612.0, 792.0, vec![make_run("A", 0.0, 0.0)]).unwrap();
        assert_eq!(page.index(), 4);
        assert_eq!(page.runs()[0].page_index, 4);
        assert_eq!(page.bbox(), BBox::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_page_rejects_negative_run_width() {
        let run = TextRun::new("A", 10.0, 10.0, -5.0, 8.0);
        let err = Page::new(0, 612.0, 792.0, vec![run]).unwrap_err();
        assert!(matches!(err, Error::MalformedPage { page: 0, .. }));
        assert!(err.to_string().contains("negative width"));
    }

    #[test]
    fn test_page_rejects_negative_run_height() {
        let run = TextRun::new("A", 10.0, 10.0, 5.0, -1.0);
        let err = Page::new(2, 612.0, 792.0, vec![run]).unwrap_err();
        assert!(err.to_string().contains("negative height"));
    }

    #[test]
    fn test_page_rejects_nan_coordinates() {
        let run = TextRun::new("A", f64::NAN, 10.0, 5.0, 5.0);
        assert!(Page::new(0, 612.0, 792.0, vec![run]).is_err());
    }

    #[test]
    fn test_page_rejects_non_positive_size() {
        assert!(Page::new(0, 0.0, 792.0, Vec::new()).is_err());
        assert!(Page::new(0, 612.0, -1.0, Vec::new()).is_err());
        assert!(Page::new(0, f64::INFINITY, 792.0, Vec::new()).is_err());
    }

    #[test]
    fn test_page_rejects_bad_geometry() {
        let lines = vec![Line::horizontal(f64::NAN, 0.0, 10.0)];
        assert!(Page::with_geometry(0, 100.0, 100.0, Vec::new(), lines, Vec::new()).is_err());

        let rects = vec![Rect::new(10.0, 10.0, 5.0, 20.0)];
        assert!(Page::with_geometry(0, 100.0, 100.0, Vec::new(), Vec::new(), rects).is_err());
    }

    #[test]
    fn test_page_accepts_zero_size_run() {
        let run = TextRun::new("", 10.0, 10.0, 0.0, 0.0);
        assert!(Page::new(0, 100.0, 100.0, vec![run]).is_ok());
    }

    #[test]
    fn test_document_requires_matching_indices() {
        let p0 = Page::new(0, 100.0, 100.0, Vec::new()).unwrap();
        let p1 = Page::new(1, 100.0, 100.0, Vec::new()).unwrap();
        let doc = Document::new(vec![p0.clone(), p1]).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page(1).map(Page::index), Some(1));

        let wrong = Page::new(5, 100.0, 100.0, Vec::new()).unwrap();
        let err = Document::new(vec![p0, wrong]).unwrap_err();
        assert!(matches!(err, Error::MalformedPage { page: 5, .. }));
    }

    #[test]
    fn test_document_layout_conversion() {
        let layout = DocumentLayout {
            pages: vec![
                PageLayout {
                    index: None,
                    width: 200.0,
                    height: 100.0,
                    runs: vec![RunLayout {
                        text: "Qty".to_string(),
                        x: 10.0,
                        y: 20.0,
                        width: 15.0,
                        height: 8.0,
                        font_size: Some(9.0),
                    }],
                    lines: vec![Line::horizontal(5.0, 0.0, 200.0)],
                    rects: Vec::new(),
                },
                PageLayout {
                    index: None,
                    width: 200.0,
                    height: 100.0,
                    runs: Vec::new(),
                    lines: Vec::new(),
                    rects: Vec::new(),
                },
            ],
        };
        let doc = Document::try_from(layout).unwrap();
        assert_eq!(doc.page_count(), 2);
        let run = &doc.pages()[0].runs()[0];
        assert_eq!(run.font_size, 9.0);
        assert_eq!(run.bbox, BBox::new(10.0, 20.0, 25.0, 28.0));
        assert_eq!(doc.pages()[0].lines().len(), 1);
        assert_eq!(doc.pages()[1].index(), 1);
    }
}
