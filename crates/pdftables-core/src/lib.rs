//! pdftables-core: table detection and template-driven extraction over
//! positioned PDF text.
//!
//! The crate starts where a PDF content provider stops: a [`Page`] holds the
//! page's text runs (and, when available, its drawn lines and rectangles).
//! Two extraction paths produce the same [`Table`] type:
//!
//! - [`TableExtractor`] finds tables automatically, from drawn rulings or,
//!   failing that, from whitespace alignment of the text.
//! - [`TemplateExtractor`] maps a declarative [`Template`] (fixed column/row
//!   layouts plus text fields), usually loaded from XML with
//!   [`load_template_str`], onto a page.
//!
//! ```
//! use pdftables_core::{Page, TextRun, extract_tables};
//!
//! let runs = vec![
//!     TextRun::new("Name", 10.0, 10.0, 20.0, 10.0),
//!     TextRun::new("Qty", 100.0, 10.0, 15.0, 10.0),
//!     TextRun::new("Apple", 10.0, 30.0, 25.0, 10.0),
//!     TextRun::new("3", 100.0, 30.0, 5.0, 10.0),
//! ];
//! let page = Page::new(0, 612.0, 792.0, runs).unwrap();
//! let tables = extract_tables(&page);
//! assert_eq!(tables[0].text(1, 0), Some("Apple"));
//! ```

pub mod error;
pub mod geometry;
pub mod grid;
pub mod page;
pub mod ruling;
pub mod settings;
pub mod shapes;
pub mod table;
pub mod template;
pub mod template_extract;
pub mod template_xml;
pub mod text;

pub use error::{Error, LayoutIssue, Loaded, Result, TemplateDiagnostic};
pub use geometry::{BBox, Orientation};
pub use grid::{TableGrid, build_grids, join_rulings, snap_rulings};
pub use page::{Document, DocumentLayout, Page, PageLayout, RunLayout};
pub use ruling::{
    RulingSegment, RulingSource, detect_rulings, drawn_rulings, infer_rulings, ruling_from_line,
    rulings_from_rect,
};
pub use settings::{ExtractionSettings, MergeEmpty, Strategy};
pub use shapes::{Line, Rect};
pub use table::{
    Cell, Table, TableExtractor, assign_runs, build_table, extract_document_tables,
    extract_tables, group_by_page,
};
pub use template::{
    FieldRule, Template, TemplateField, TemplateItem, TemplateTable, TemplateTableLayout,
};
pub use template_extract::{
    ExtractedField, FieldValue, TemplateExtractor, apply_template, parse_document, parse_page,
};
pub use template_xml::{load_template_file, load_template_str};
pub use text::TextRun;
