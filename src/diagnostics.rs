//! Recoverable layout diagnostics.
//!
//! Structural oddities in the input never abort a layout run. Each one is
//! recorded as a [`Diagnostic`] next to the best-effort result and logged
//! at warn level.

use serde::Serialize;
use std::fmt;

/// Grid axis a span runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// colSpan
    Col,
    /// rowSpan
    Row,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Col => f.write_str("colSpan"),
            Axis::Row => f.write_str("rowSpan"),
        }
    }
}

/// A recoverable condition found during resolution or pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A cell's span reached past the grid and was clamped.
    SpanOverflow {
        /// Table section id
        table: String,
        /// Row index
        row: usize,
        /// Cell index within the row
        cell: usize,
        /// Which span overflowed
        axis: Axis,
        /// Declared span
        declared: u32,
        /// Span after clamping
        clamped: u32,
    },
    /// A cell found no free column left in its row and was dropped from the grid.
    UnplacedCell {
        /// Table section id
        table: String,
        /// Row index
        row: usize,
        /// Cell index within the row
        cell: usize,
    },
    /// An atomic section is taller than a whole page; it was placed anyway.
    OversizedSection {
        /// Section index
        section: usize,
        /// Section id
        id: String,
        /// Measured height
        height: f32,
        /// Useful page height
        budget: f32,
    },
}

impl Diagnostic {
    /// Short machine-readable kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::SpanOverflow { .. } => "span_overflow",
            Diagnostic::UnplacedCell { .. } => "unplaced_cell",
            Diagnostic::OversizedSection { .. } => "oversized_section",
        }
    }

    /// Log the diagnostic and hand it back.
    pub(crate) fn emit(self) -> Self {
        log::warn!("{}", self);
        self
    }
}

fn table_prefix(f: &mut fmt::Formatter<'_>, table: &str) -> fmt::Result {
    if table.is_empty() {
        Ok(())
    } else {
        write!(f, "table {}: ", table)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SpanOverflow {
                table,
                row,
                cell,
                axis,
                declared,
                clamped,
            } => {
                table_prefix(f, table)?;
                write!(
                    f,
                    "cell {} of row {} declares {} {} past the grid, clamped to {}",
                    cell, row, axis, declared, clamped
                )
            }
            Diagnostic::UnplacedCell { table, row, cell } => {
                table_prefix(f, table)?;
                write!(
                    f,
                    "cell {} of row {} has no free column and was not placed",
                    cell, row
                )
            }
            Diagnostic::OversizedSection {
                section,
                id,
                height,
                budget,
            } => write!(
                f,
                "section {} ({}) is {:.1} tall, more than the page budget {:.1}; it will visually overflow",
                section, id, height, budget
            ),
        }
    }
}
