//! Logical grid resolution for tables with merged cells.
//!
//! Rows list only the cells they *declare*; a cell with `rowSpan > 1` silently
//! occupies columns in the rows below it. Resolution walks each row left to
//! right, skipping columns still covered from above, and places the row's
//! cells into the first free columns. The result is a dense matrix with one
//! [`Slot`] per (row, column).

use crate::diagnostics::{Axis, Diagnostic};
use crate::model::{Cell, Row, TableSection};
use serde::Serialize;

/// Address of a declared cell: `rows[row].cells[cell]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CellRef {
    /// Row index
    pub row: usize,
    /// Cell index within the row
    pub cell: usize,
}

/// One (row, column) position of the logical grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum Slot {
    /// Nothing addressed here (short row)
    Empty,
    /// Covered by a cell declared in this row.
    ///
    /// `top_left` is true only at the column where the cell starts.
    Occupied {
        /// Owning cell
        cell: CellRef,
        /// Anchor column of the cell
        top_left: bool,
    },
    /// Covered by the rowSpan of a cell declared in an earlier row.
    ///
    /// Columns a colSpan takes in the cell's own row are
    /// `Occupied { top_left: false }`, not `Covered`.
    Covered {
        /// Owning cell
        by: CellRef,
    },
}

impl Slot {
    /// Owning cell, if any.
    pub fn owner(&self) -> Option<CellRef> {
        match *self {
            Slot::Empty => None,
            Slot::Occupied { cell, .. } => Some(cell),
            Slot::Covered { by } => Some(by),
        }
    }

    /// Check if the slot is unaddressed.
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// Dense row × column matrix of slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalGrid {
    total_cols: usize,
    slots: Vec<Vec<Slot>>,
    diagnostics: Vec<Diagnostic>,
}

impl LogicalGrid {
    /// Number of logical columns.
    pub fn total_cols(&self) -> usize {
        self.total_cols
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot at (row, col), `None` when out of bounds.
    pub fn slot(&self, row: usize, col: usize) -> Option<&Slot> {
        self.slots.get(row).and_then(|r| r.get(col))
    }

    /// Cell owning (row, col), whether declared there or spanning into it.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<CellRef> {
        self.slot(row, col).and_then(Slot::owner)
    }

    /// All slots of one row; empty for an out-of-range row.
    pub fn row_slots(&self, row: usize) -> &[Slot] {
        self.slots.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when (row, col) belongs to a span anchored at another slot.
    pub fn is_spanned(&self, row: usize, col: usize) -> bool {
        matches!(
            self.slot(row, col),
            Some(Slot::Occupied {
                top_left: false,
                ..
            }) | Some(Slot::Covered { .. })
        )
    }

    /// Cells that start in this row, with their anchor column.
    pub fn anchors_in_row(&self, row: usize) -> impl Iterator<Item = (usize, CellRef)> + '_ {
        self.row_slots(row)
            .iter()
            .enumerate()
            .filter_map(|(col, slot)| match *slot {
                Slot::Occupied {
                    cell,
                    top_left: true,
                } => Some((col, cell)),
                _ => None,
            })
    }

    /// Number of columns addressed in a row (occupied or covered).
    pub fn filled_width(&self, row: usize) -> usize {
        self.row_slots(row).iter().filter(|s| !s.is_empty()).count()
    }

    /// Look up the declared cell behind a reference.
    pub fn resolve_cell<'a>(&self, rows: &'a [Row], cell: CellRef) -> Option<&'a Cell> {
        rows.get(cell.row).and_then(|r| r.cells.get(cell.cell))
    }

    /// Diagnostics raised while resolving.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take ownership of the diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Widest row measured in colSpan units.
pub fn infer_total_cols(rows: &[Row]) -> usize {
    rows.iter().map(Row::span_width).max().unwrap_or(0)
}

/// Resolve rows into a grid of `total_cols` columns.
pub fn resolve(rows: &[Row], total_cols: usize) -> LogicalGrid {
    resolve_inner("", rows, total_cols)
}

/// Resolve a table section, taking the column count from its width specs
/// when present and inferring it from the rows otherwise.
pub fn resolve_table(table: &TableSection) -> LogicalGrid {
    let total_cols = match &table.column_widths {
        Some(widths) if !widths.is_empty() => widths.len(),
        _ => infer_total_cols(&table.rows),
    };
    resolve_inner(&table.id, &table.rows, total_cols)
}

fn resolve_inner(table: &str, rows: &[Row], total_cols: usize) -> LogicalGrid {
    let row_count = rows.len();
    let mut slots = vec![vec![Slot::Empty; total_cols]; row_count];
    let mut diagnostics = Vec::new();
    // first row index at which each column is free again
    let mut occupied_until = vec![0usize; total_cols];

    for (r, row) in rows.iter().enumerate() {
        let mut col = 0;

        for (ci, cell) in row.cells.iter().enumerate() {
            while col < total_cols && occupied_until[col] > r {
                col += 1;
            }
            if col >= total_cols {
                diagnostics.push(
                    Diagnostic::UnplacedCell {
                        table: table.to_string(),
                        row: r,
                        cell: ci,
                    }
                    .emit(),
                );
                continue;
            }

            let declared_cols = cell.col_span() as usize;
            let mut width = 0;
            while width < declared_cols
                && col + width < total_cols
                && occupied_until[col + width] <= r
            {
                width += 1;
            }
            if width < declared_cols {
                diagnostics.push(
                    Diagnostic::SpanOverflow {
                        table: table.to_string(),
                        row: r,
                        cell: ci,
                        axis: Axis::Col,
                        declared: cell.col_span(),
                        clamped: width as u32,
                    }
                    .emit(),
                );
            }

            let declared_rows = cell.row_span() as usize;
            let height = declared_rows.min(row_count - r);
            if height < declared_rows {
                diagnostics.push(
                    Diagnostic::SpanOverflow {
                        table: table.to_string(),
                        row: r,
                        cell: ci,
                        axis: Axis::Row,
                        declared: cell.row_span(),
                        clamped: height as u32,
                    }
                    .emit(),
                );
            }

            let owner = CellRef { row: r, cell: ci };
            for c in col..col + width {
                slots[r][c] = Slot::Occupied {
                    cell: owner,
                    top_left: c == col,
                };
                for below in slots.iter_mut().take(r + height).skip(r + 1) {
                    below[c] = Slot::Covered { by: owner };
                }
                occupied_until[c] = r + height;
            }
            col += width;
        }
    }

    log::debug!(
        "grid: resolved {} rows x {} cols ({} diagnostics)",
        row_count,
        total_cols,
        diagnostics.len()
    );

    LogicalGrid {
        total_cols,
        slots,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(n: usize) -> Vec<Cell> {
        (0..n).map(|i| Cell::text(format!("c{}", i))).collect()
    }

    #[test]
    fn test_infer_total_cols() {
        let rows = vec![
            Row::new("a", vec![Cell::text("t").colspan(4), Cell::checkbox(false).colspan(2)]),
            Row::new("b", cells(3)),
        ];
        assert_eq!(infer_total_cols(&rows), 6);
        assert_eq!(infer_total_cols(&[]), 0);
    }

    #[test]
    fn test_simple_grid() {
        let rows = vec![Row::new("a", cells(3)), Row::new("b", cells(3))];
        let grid = resolve(&rows, 3);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.cell_at(1, 2), Some(CellRef { row: 1, cell: 2 }));
        assert!(grid.diagnostics().is_empty());
        assert_eq!(grid.anchors_in_row(0).count(), 3);
    }

    #[test]
    fn test_rowspan_skips_covered_columns() {
        let rows = vec![
            Row::new(
                "anchor",
                vec![
                    Cell::text("QI7.0513").rowspan(3),
                    Cell::text("Ruido").rowspan(3),
                    Cell::text("p"),
                ],
            ),
            Row::new("c1", cells(1)),
            Row::new("c2", cells(1)),
        ];
        let grid = resolve(&rows, 3);
        assert_eq!(
            grid.slot(1, 0),
            Some(&Slot::Covered {
                by: CellRef { row: 0, cell: 0 }
            })
        );
        assert_eq!(grid.cell_at(2, 2), Some(CellRef { row: 2, cell: 0 }));
        assert!(grid.is_spanned(2, 1));
        assert!(!grid.is_spanned(2, 2));
    }

    #[test]
    fn test_short_row_leaves_empty_slots() {
        let rows = vec![Row::new("a", cells(6)), Row::new("b", cells(3))];
        let grid = resolve(&rows, 6);
        assert_eq!(grid.filled_width(1), 3);
        assert_eq!(grid.slot(1, 4), Some(&Slot::Empty));
        assert!(grid.diagnostics().is_empty());
    }

    #[test]
    fn test_colspan_clamped() {
        let rows = vec![Row::new("a", vec![Cell::text("x"), Cell::text("wide").colspan(5)])];
        let grid = resolve(&rows, 3);
        assert_eq!(grid.filled_width(0), 3);
        assert_eq!(
            grid.diagnostics(),
            &[Diagnostic::SpanOverflow {
                table: String::new(),
                row: 0,
                cell: 1,
                axis: Axis::Col,
                declared: 5,
                clamped: 2,
            }]
        );
    }

    #[test]
    fn test_rowspan_clamped_at_last_row() {
        let rows = vec![Row::new("a", vec![Cell::text("x").rowspan(4)])];
        let grid = resolve(&rows, 1);
        assert_eq!(grid.diagnostics().len(), 1);
        assert!(matches!(
            grid.diagnostics()[0],
            Diagnostic::SpanOverflow {
                axis: Axis::Row,
                clamped: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_extra_cell_unplaced() {
        let rows = vec![Row::new("a", cells(3))];
        let grid = resolve(&rows, 2);
        assert!(matches!(
            grid.diagnostics(),
            [Diagnostic::UnplacedCell { row: 0, cell: 2, .. }]
        ));
    }

    #[test]
    fn test_resolve_table_uses_column_widths() {
        let mut table = TableSection::new("t").with_row(Row::new("a", cells(2)));
        table.column_widths = Some(vec!["50%".into(), "25%".into(), "25%".into()]);
        let grid = resolve_table(&table);
        assert_eq!(grid.total_cols(), 3);
        assert_eq!(grid.slot(0, 2), Some(&Slot::Empty));
    }

    #[test]
    fn test_resolve_cell() {
        let rows = vec![Row::new("a", vec![Cell::text("x").colspan(2)])];
        let grid = resolve(&rows, 2);
        let owner = grid.cell_at(0, 1).unwrap();
        assert_eq!(grid.resolve_cell(&rows, owner).unwrap().text_value(), "x");
    }
}
