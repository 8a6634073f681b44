//! Table canonicalization.
//!
//! Upstream conversion produces tables with inconsistent row shapes. The
//! canonicalizer recognizes two families by their content and rewrites each
//! into a fixed schema:
//!
//! - **outcome-block** tables: repeated title / header / subheader / data
//!   blocks, each data row ending in three mutually exclusive outcome boxes;
//! - **continuation-row** tables: descriptive test tables where an anchor
//!   row spans the continuation rows below it.
//!
//! Canonicalization is pure and idempotent. Tables outside both families,
//! and rows no rule recognizes, are passed through unchanged.

mod continuation;
mod options;
mod outcome;
mod patterns;
mod rules;
mod text;

pub use options::{CanonicalOptions, Labels, DEFAULT_FOOTNOTES};
pub use patterns::{Pattern, PatternConfig, PatternSet};
pub use rules::{
    classify_continuation_row, classify_outcome_row, ContinuationShape, Rule, RowShape, RowView,
    CONTINUATION_RULES, OUTCOME_RULES,
};
pub use text::{fold, fold_with_spans, Folded};

use crate::model::{Document, Section, TableSection, TextSection};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

/// Canonical table family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFamily {
    /// Title + header + subheader + data blocks with outcome checkboxes
    OutcomeBlock,
    /// Anchor rows spanning continuation rows
    Continuation,
}

impl fmt::Display for TableFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFamily::OutcomeBlock => f.write_str("outcome-block"),
            TableFamily::Continuation => f.write_str("continuation"),
        }
    }
}

/// Table canonicalizer.
///
/// # Example
///
/// ```
/// use protolayout::canonical::{Canonicalizer, TableFamily};
/// use protolayout::model::{Cell, Row, TableSection};
///
/// let table = TableSection::new("sec_1")
///     .with_headers(["Ripple Test", "Ver especificación del cliente"])
///     .with_row(Row::new("r1", vec![
///         Cell::text("Ripple"), Cell::text(""), Cell::text("≤ 0.1"),
///         Cell::checkbox(false), Cell::checkbox(false), Cell::checkbox(false),
///     ]));
///
/// let canonicalizer = Canonicalizer::new();
/// assert_eq!(canonicalizer.classify_table(&table), Some(TableFamily::OutcomeBlock));
/// let canonical = canonicalizer.canonicalize(&table);
/// assert_eq!(canonical.rows.len(), 4);
/// assert_eq!(canonicalizer.canonicalize(&canonical), canonical);
/// ```
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    patterns: PatternSet,
    options: CanonicalOptions,
}

impl Canonicalizer {
    /// Create a canonicalizer with the built-in patterns and default options.
    pub fn new() -> Self {
        Self {
            patterns: PatternSet::default(),
            options: CanonicalOptions::default(),
        }
    }

    /// Use a compiled pattern set.
    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = patterns;
        self
    }

    /// Set options.
    pub fn with_options(mut self, options: CanonicalOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the pattern set.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Get the options.
    pub fn options(&self) -> &CanonicalOptions {
        &self.options
    }

    /// Detect which canonical family a table belongs to, if any.
    ///
    /// Descriptive tables are checked first; they never take the
    /// outcome-block schema.
    pub fn classify_table(&self, table: &TableSection) -> Option<TableFamily> {
        if continuation::is_descriptive(table, &self.patterns) {
            return Some(TableFamily::Continuation);
        }
        if self.is_outcome_table(table) {
            return Some(TableFamily::OutcomeBlock);
        }
        None
    }

    fn is_outcome_table(&self, table: &TableSection) -> bool {
        if outcome::declares_block(table, &self.patterns) {
            return true;
        }

        let mut header = false;
        let mut subheader = false;
        for row in &table.rows {
            let view = RowView::new(row);
            match classify_outcome_row(&view, &self.patterns).0 {
                RowShape::Header | RowShape::CombinedHeader => header = true,
                RowShape::Subheader => subheader = true,
                RowShape::BlockTitle {
                    toggle: Some(_), ..
                } if self.patterns.is_match(Pattern::ClientSpec, view.text(1)) => return true,
                _ => {}
            }
            if header && subheader {
                return true;
            }
        }
        false
    }

    /// Canonicalize one table. Tables outside both families come back unchanged.
    pub fn canonicalize(&self, table: &TableSection) -> TableSection {
        self.canonicalize_with_family(table).0
    }

    fn canonicalize_with_family(&self, table: &TableSection) -> (TableSection, Option<TableFamily>) {
        let family = self.classify_table(table);
        log::debug!(
            "{}: {}",
            table.id,
            family.map_or_else(|| "no canonical family".to_string(), |f| f.to_string())
        );
        let canonical = match family {
            Some(TableFamily::OutcomeBlock) => {
                outcome::canonicalize_outcome(table, &self.patterns, &self.options)
            }
            Some(TableFamily::Continuation) => {
                continuation::canonicalize_continuation(table, &self.patterns)
            }
            None => table.clone(),
        };
        (canonical, family)
    }

    /// Canonicalize every table of a document.
    ///
    /// Returns a new document; section order is preserved. When footnotes
    /// are configured, a text section follows each descriptive table.
    pub fn canonicalize_document(&self, doc: &Document) -> Document {
        let convert = |section: &Section| match section {
            Section::Table(table) => {
                let (canonical, family) = self.canonicalize_with_family(table);
                (Section::Table(canonical), family)
            }
            other => (other.clone(), None),
        };

        let converted: Vec<(Section, Option<TableFamily>)> = if self.options.parallel {
            doc.sections.par_iter().map(convert).collect()
        } else {
            doc.sections.iter().map(convert).collect()
        };

        let outcome_tables = converted
            .iter()
            .filter(|(_, f)| *f == Some(TableFamily::OutcomeBlock))
            .count();
        let continuation_tables = converted
            .iter()
            .filter(|(_, f)| *f == Some(TableFamily::Continuation))
            .count();
        log::info!(
            "canonicalized {} sections ({} outcome-block, {} continuation tables)",
            converted.len(),
            outcome_tables,
            continuation_tables
        );

        let mut sections = Vec::with_capacity(converted.len());
        let mut iter = converted.into_iter().peekable();
        while let Some((section, family)) = iter.next() {
            let footnote = match (&self.options.footnotes, family) {
                (Some(text), Some(TableFamily::Continuation)) => {
                    let id = format!("{}_footnotes", section.id());
                    let present = iter
                        .peek()
                        .is_some_and(|(next, _)| is_footnotes(next, &id, text));
                    (!present).then(|| Section::Text(TextSection::new(id, text.clone())))
                }
                _ => None,
            };
            sections.push(section);
            sections.extend(footnote);
        }

        Document {
            sections,
            ..doc.clone()
        }
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_footnotes(section: &Section, id: &str, text: &str) -> bool {
    match section {
        Section::Text(t) => t.id == id || t.content.trim() == text.trim(),
        _ => false,
    }
}

/// Canonicalize a table with the built-in patterns.
pub fn canonicalize(table: &TableSection) -> TableSection {
    Canonicalizer::new().canonicalize(table)
}

/// Canonicalize every table of a document with the built-in patterns.
pub fn canonicalize_document(doc: &Document) -> Document {
    Canonicalizer::new().canonicalize_document(doc)
}

/// Detect a table's canonical family with the built-in patterns.
pub fn classify_table(table: &TableSection) -> Option<TableFamily> {
    Canonicalizer::new().classify_table(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Row};

    fn plain_table() -> TableSection {
        TableSection::new("plain")
            .with_headers(["Modelo", "Serie"])
            .with_row(Row::from_strings("r1", ["1260", "DE123"]))
    }

    #[test]
    fn test_plain_table_untouched() {
        let table = plain_table();
        assert_eq!(classify_table(&table), None);
        assert_eq!(canonicalize(&table), table);
    }

    #[test]
    fn test_header_and_subheader_sniff() {
        let table = TableSection::new("t").with_rows(vec![
            Row::from_strings("h", ["Parámetro", "Resultado", "Especificación", "Conclusiones"]),
            Row::from_strings("s", ["Cumple", "No cumple", "No aplica"]),
        ]);
        assert_eq!(classify_table(&table), Some(TableFamily::OutcomeBlock));

        let header_only = TableSection::new("t").with_rows(vec![Row::from_strings(
            "h",
            ["Parámetro", "Resultado", "Especificación", "Conclusiones"],
        )]);
        assert_eq!(classify_table(&header_only), None);
    }

    #[test]
    fn test_canonical_title_sniff() {
        let table = TableSection::new("t").with_rows(vec![Row::new(
            "b1",
            vec![
                Cell::text("Ruido").colspan(4).header(),
                Cell::checkbox(false).colspan(2).labeled("Ver especificación\ndel cliente"),
            ],
        )]);
        assert_eq!(classify_table(&table), Some(TableFamily::OutcomeBlock));
    }

    #[test]
    fn test_document_footnotes() {
        let descriptive = TableSection::new("sec_8").with_rows(vec![Row::from_strings(
            "a",
            ["QI1.01", "Test", "p", "s", ""],
        )]);
        let doc = Document::new("tpl", "HPLC")
            .with_section(descriptive.into())
            .with_section(plain_table().into());

        let canonicalizer =
            Canonicalizer::new().with_options(CanonicalOptions::new().with_default_footnotes().sequential());
        let once = canonicalizer.canonicalize_document(&doc);
        assert_eq!(once.section_count(), 3);
        assert_eq!(once.sections[1].id(), "sec_8_footnotes");
        assert_eq!(once.sections[2].id(), "plain");

        let twice = canonicalizer.canonicalize_document(&once);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_document_order_parallel() {
        let mut doc = Document::new("tpl", "HPLC");
        for i in 0..32 {
            doc.add_section(
                TableSection::new(format!("sec_{}", i))
                    .with_row(Row::from_strings("r", ["x"]))
                    .into(),
            );
        }
        let out = canonicalize_document(&doc);
        let ids: Vec<&str> = out.sections.iter().map(Section::id).collect();
        let expected: Vec<String> = (0..32).map(|i| format!("sec_{}", i)).collect();
        assert_eq!(ids, expected);
    }
}
