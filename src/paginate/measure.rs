//! Section height measurement.

use crate::grid::infer_total_cols;
use crate::model::{Row, Section, TableSection};

/// Measures the rendered height of a section.
///
/// Hosts with a real layout engine implement this (or pass a closure);
/// heights are in device-independent units matching the page budget.
pub trait Measure {
    /// Height of the section when rendered at the fixed page width.
    fn measure(&self, section: &Section) -> f32;
}

impl<F> Measure for F
where
    F: Fn(&Section) -> f32,
{
    fn measure(&self, section: &Section) -> f32 {
        self(section)
    }
}

/// Metrics for [`EstimatedHeight`], in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateMetrics {
    /// Height of one line of body text
    pub line_height: f32,
    /// Minimum height of a table row
    pub row_height: f32,
    /// Height of a section title
    pub title_height: f32,
    /// Vertical gap after every section
    pub section_gap: f32,
    /// Characters fitting on one full-width line
    pub chars_per_line: usize,
    /// Height of one checklist item
    pub checklist_item_height: f32,
    /// Height of the signature block
    pub signature_height: f32,
}

impl EstimateMetrics {
    /// Create metrics with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set line height.
    pub fn with_line_height(mut self, height: f32) -> Self {
        self.line_height = height;
        self
    }

    /// Set minimum row height.
    pub fn with_row_height(mut self, height: f32) -> Self {
        self.row_height = height;
        self
    }

    /// Set characters per full-width line.
    pub fn with_chars_per_line(mut self, chars: usize) -> Self {
        self.chars_per_line = chars.max(1);
        self
    }

    /// Set the gap after each section.
    pub fn with_section_gap(mut self, gap: f32) -> Self {
        self.section_gap = gap;
        self
    }
}

impl Default for EstimateMetrics {
    fn default() -> Self {
        Self {
            line_height: 4.5,
            row_height: 6.0,
            title_height: 7.0,
            section_gap: 3.0,
            chars_per_line: 100,
            checklist_item_height: 5.0,
            signature_height: 30.0,
        }
    }
}

/// Deterministic line-count estimate of section heights.
///
/// Meant for hosts without a layout engine (the CLI, benchmarks). It wraps
/// text by character count only and ignores fonts entirely.
#[derive(Debug, Clone, Default)]
pub struct EstimatedHeight {
    metrics: EstimateMetrics,
}

impl EstimatedHeight {
    /// Create an estimator with default metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an estimator with custom metrics.
    pub fn with_metrics(metrics: EstimateMetrics) -> Self {
        Self { metrics }
    }

    /// Get the metrics.
    pub fn metrics(&self) -> &EstimateMetrics {
        &self.metrics
    }

    fn title(&self, title: Option<&str>) -> f32 {
        match title {
            Some(t) if !t.trim().is_empty() => self.metrics.title_height,
            _ => 0.0,
        }
    }

    fn table_height(&self, table: &TableSection) -> f32 {
        let total_cols = infer_total_cols(&table.rows).max(table.headers.len()).max(1);
        let mut height = 0.0;
        if !table.headers.is_empty() {
            let width = self.metrics.chars_per_line / total_cols;
            let lines = table
                .headers
                .iter()
                .map(|h| wrapped_lines(h, width))
                .max()
                .unwrap_or(1);
            height += self.row(lines);
        }
        height += table
            .rows
            .iter()
            .map(|row| self.row(self.row_lines(row, total_cols)))
            .sum::<f32>();
        if let Some(caption) = &table.caption {
            height += wrapped_lines(caption, self.metrics.chars_per_line) as f32
                * self.metrics.line_height;
        }
        height
    }

    fn row_lines(&self, row: &Row, total_cols: usize) -> usize {
        row.cells
            .iter()
            .map(|cell| {
                let width = self.metrics.chars_per_line * cell.col_span() as usize / total_cols;
                let lines = wrapped_lines(&cell.display_text(), width);
                // a tall span shares its lines across the rows it covers
                lines.div_ceil(cell.row_span() as usize)
            })
            .max()
            .unwrap_or(1)
    }

    fn row(&self, lines: usize) -> f32 {
        (lines as f32 * self.metrics.line_height).max(self.metrics.row_height)
    }
}

impl Measure for EstimatedHeight {
    fn measure(&self, section: &Section) -> f32 {
        let m = &self.metrics;
        let body = match section {
            Section::Text(s) => {
                wrapped_lines(&s.content, m.chars_per_line) as f32 * m.line_height
            }
            Section::Checklist(s) => s.items.len() as f32 * m.checklist_item_height,
            Section::Table(t) => self.table_height(t),
            Section::Signatures(_) => m.signature_height,
        };
        self.title(section.title()) + body + m.section_gap
    }
}

/// Lines taken by text wrapped at `width` characters; at least one.
fn wrapped_lines(text: &str, width: usize) -> usize {
    let width = width.max(1);
    text.lines()
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum::<usize>()
        .max(1)
}
