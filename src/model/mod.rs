//! Document model types.
//!
//! These mirror the JSON shape produced by the upstream document converter:
//! a document is an ordered list of sections, and table sections carry rows
//! of typed cells with optional row/column spans.

mod document;
mod page;
mod table;

pub use document::{
    ChecklistItem, ChecklistSection, Document, Section, SignatureItem, SignaturesSection,
    TextSection,
};
pub use page::Page;
pub use table::{
    Cell, CellKind, CellValue, CellVariant, CheckboxGroup, InlineRun, Row, TableSection,
};
