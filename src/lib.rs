//! # protolayout
//!
//! Layout core for structured technical documents: protocols and reports made
//! of text blocks, checklists, tables and signature blocks.
//!
//! Three stages run over a [`Document`]:
//!
//! - [`grid`] resolves rows with colSpan/rowSpan into an addressable logical grid;
//! - [`canonical`] rewrites loosely-structured tables into a fixed schema;
//! - [`paginate`] packs sections onto pages without ever splitting one.
//!
//! ## Quick Start
//!
//! ```no_run
//! use protolayout::{parse_file, Protolayout};
//! use protolayout::paginate::EstimatedHeight;
//!
//! fn main() -> protolayout::Result<()> {
//!     let doc = parse_file("protocol.json")?;
//!
//!     let result = Protolayout::new()
//!         .with_useful_height(270.0)?
//!         .run(&doc, &EstimatedHeight::new());
//!
//!     for page in &result.pages {
//!         println!("page {}: sections {:?}", page.number, page.sections);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Structural oddities never fail a run; they come back as
//! [`Diagnostic`] values next to the result.

pub mod canonical;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod model;
pub mod paginate;
pub mod render;

// Re-export commonly used types
pub use canonical::{
    canonicalize, canonicalize_document, classify_table, CanonicalOptions, Canonicalizer,
    PatternConfig, PatternSet, TableFamily,
};
pub use diagnostics::{Axis, Diagnostic};
pub use error::{Error, Result};
pub use grid::{resolve, resolve_table, CellRef, LogicalGrid, Slot};
pub use model::{Cell, CellKind, CellVariant, Document, Page, Row, Section, TableSection};
pub use paginate::{paginate, EstimatedHeight, Measure, PageBudget, PageMargins, Pagination};
pub use render::{to_json, to_text, JsonFormat};

use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Load a document from a JSON file.
///
/// # Example
///
/// ```no_run
/// use protolayout::parse_file;
///
/// let doc = parse_file("protocol.json").unwrap();
/// println!("Sections: {}", doc.section_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let data = std::fs::read_to_string(path)?;
    parse_str(&data)
}

/// Load a document from a JSON string.
pub fn parse_str(json: &str) -> Result<Document> {
    let doc: Document = serde_json::from_str(json)?;
    log::debug!("loaded document {} with {} sections", doc.id, doc.section_count());
    Ok(doc)
}

/// Load a document from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let doc: Document = serde_json::from_reader(reader)?;
    log::debug!("loaded document {} with {} sections", doc.id, doc.section_count());
    Ok(doc)
}

/// Output of a full layout run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    /// Canonicalized document
    pub document: Document,
    /// Page assignment over `document.sections`
    pub pages: Vec<Page>,
    /// Grid diagnostics of every table, then pagination diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

impl LayoutResult {
    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if any diagnostic was raised.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Sections placed on a page.
    pub fn sections_on<'a>(&'a self, page: &'a Page) -> impl Iterator<Item = &'a Section> + 'a {
        page.sections
            .iter()
            .filter_map(|&i| self.document.sections.get(i))
    }

    /// Plain-text preview of the paginated document.
    pub fn preview(&self) -> String {
        render::to_text(&self.document, &self.pages)
    }
}

/// Canonicalize and paginate a document with the built-in patterns.
///
/// # Example
///
/// ```
/// use protolayout::{layout, CanonicalOptions, PageBudget};
/// use protolayout::model::{Document, Section, TextSection};
///
/// let doc = Document::new("tpl", "HPLC")
///     .with_section(TextSection::new("intro", "Scope").into());
/// let budget = PageBudget::new(100.0)?;
/// let result = layout(&doc, &|_: &Section| -> f32 { 20.0 }, &budget, &CanonicalOptions::default());
/// assert_eq!(result.page_count(), 1);
/// # Ok::<(), protolayout::Error>(())
/// ```
pub fn layout<M>(
    doc: &Document,
    measure: &M,
    budget: &PageBudget,
    options: &CanonicalOptions,
) -> LayoutResult
where
    M: Measure + ?Sized,
{
    let canonicalizer = Canonicalizer::new().with_options(options.clone());
    run_layout(&canonicalizer, doc, measure, budget)
}

fn run_layout<M>(
    canonicalizer: &Canonicalizer,
    doc: &Document,
    measure: &M,
    budget: &PageBudget,
) -> LayoutResult
where
    M: Measure + ?Sized,
{
    let document = canonicalizer.canonicalize_document(doc);

    let mut diagnostics: Vec<Diagnostic> = document
        .tables()
        .flat_map(|table| resolve_table(table).into_diagnostics())
        .collect();

    let pagination = paginate(&document.sections, measure, budget);
    diagnostics.extend(pagination.diagnostics);

    log::info!(
        "layout of {}: {} sections, {} pages, {} diagnostics",
        document.id,
        document.section_count(),
        pagination.pages.len(),
        diagnostics.len()
    );

    LayoutResult {
        document,
        pages: pagination.pages,
        diagnostics,
    }
}

/// Layout pipeline builder.
///
/// # Example
///
/// ```
/// use protolayout::{CanonicalOptions, Protolayout};
/// use protolayout::paginate::EstimatedHeight;
/// use protolayout::model::{Document, TextSection};
///
/// let doc = Document::new("tpl", "HPLC")
///     .with_section(TextSection::new("intro", "Scope").into());
/// let result = Protolayout::new()
///     .with_options(CanonicalOptions::new().with_default_footnotes())
///     .sequential()
///     .run(&doc, &EstimatedHeight::new());
/// assert_eq!(result.pages[0].sections, vec![0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Protolayout {
    canonicalizer: Canonicalizer,
    budget: PageBudget,
}

impl Protolayout {
    /// Create a pipeline with built-in patterns and an A4 budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set canonicalization options.
    pub fn with_options(mut self, options: CanonicalOptions) -> Self {
        self.canonicalizer = self.canonicalizer.with_options(options);
        self
    }

    /// Use a compiled pattern set.
    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.canonicalizer = self.canonicalizer.with_patterns(patterns);
        self
    }

    /// Set the page budget.
    pub fn with_budget(mut self, budget: PageBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Set the useful page height directly.
    pub fn with_useful_height(self, height: f32) -> Result<Self> {
        Ok(self.with_budget(PageBudget::new(height)?))
    }

    /// Canonicalize tables on the current thread only.
    pub fn sequential(mut self) -> Self {
        let options = self.canonicalizer.options().clone().sequential();
        self.canonicalizer = self.canonicalizer.with_options(options);
        self
    }

    /// Get the page budget.
    pub fn budget(&self) -> &PageBudget {
        &self.budget
    }

    /// Run the pipeline.
    pub fn run<M>(&self, doc: &Document, measure: &M) -> LayoutResult
    where
        M: Measure + ?Sized,
    {
        run_layout(&self.canonicalizer, doc, measure, &self.budget)
    }
}
