//! Continuation-row (descriptive) tables.
//!
//! An anchor row starting with an instruction code owns the continuation
//! rows directly below it. Its first two cells span the whole run, and each
//! continuation row is cut down to parameter, specification and new
//! specification.

use super::patterns::{Pattern, PatternSet};
use super::rules::{classify_continuation_row, ContinuationShape, RowView};
use crate::grid::infer_total_cols;
use crate::model::{Cell, Row, TableSection};

/// Descriptive tables: the five-column instruction / test / parameter /
/// specification / new specification layout.
pub(crate) fn is_descriptive(table: &TableSection, patterns: &PatternSet) -> bool {
    if table.headers.len() >= 5 {
        let has = |p: Pattern| table.headers.iter().any(|h| patterns.matches_raw(p, h));
        if has(Pattern::InstructionHeader)
            && has(Pattern::TestHeader)
            && has(Pattern::Parameter)
            && has(Pattern::NewSpecification)
        {
            return true;
        }
    }

    infer_total_cols(&table.rows) == 5
        && table.rows.iter().any(|r| {
            r.cells
                .first()
                .is_some_and(|c| patterns.matches_raw(Pattern::InstructionCode, c.text_value()))
        })
}

/// Rewrite a descriptive table into canonical form.
pub(crate) fn canonicalize_continuation(table: &TableSection, patterns: &PatternSet) -> TableSection {
    let shapes: Vec<ContinuationShape> = table
        .rows
        .iter()
        .map(|row| {
            let (shape, rule) = classify_continuation_row(&RowView::new(row), patterns);
            log::debug!("{}: row {} matched {}", table.id, row.id, rule);
            shape
        })
        .collect();

    let mut rows = Vec::with_capacity(table.rows.len());
    let mut iter = table.rows.iter().zip(shapes).peekable();

    while let Some((row, shape)) = iter.next() {
        if shape != ContinuationShape::Anchor {
            rows.push(finish_row(row.clone()));
            continue;
        }

        let mut run = Vec::new();
        while let Some((next, next_shape)) = iter.next_if(|(_, s)| s.continues()) {
            run.push(reduce(next, next_shape));
        }

        let mut anchor = row.clone();
        if !run.is_empty() {
            let span = 1 + run.len() as u32;
            for cell in anchor.cells.iter_mut().take(2) {
                cell.row_span = span;
            }
        }
        rows.push(finish_row(anchor));
        rows.extend(run.into_iter().map(finish_row));
    }

    TableSection {
        rows,
        ..table.clone()
    }
}

fn reduce(row: &Row, shape: ContinuationShape) -> Row {
    let cells = &row.cells;
    let reduced = match shape {
        ContinuationShape::Standard => {
            let last = if cells.len() >= 5 {
                cells.last().cloned()
            } else {
                None
            };
            vec![
                single(cells[2].clone()),
                cells.get(3).cloned().map(single).unwrap_or_else(Cell::empty),
                last.map(single).unwrap_or_else(|| Cell::input("")),
            ]
        }
        ContinuationShape::Misaligned => vec![
            Cell::text(cells[0].text_value()),
            Cell::text(cells[1].text_value()),
            cells.last().cloned().map(single).unwrap_or_else(Cell::empty),
        ],
        ContinuationShape::Reduced | ContinuationShape::Anchor | ContinuationShape::Other => {
            return row.clone()
        }
    };
    Row::new(row.id.clone(), reduced)
}

fn single(mut cell: Cell) -> Cell {
    cell.col_span = 1;
    cell.row_span = 1;
    cell
}

/// The trailing new-specification column is a field to fill in: a bare
/// checkbox there becomes an empty input.
fn finish_row(mut row: Row) -> Row {
    if let Some(last) = row.cells.last_mut() {
        let bare = last.is_checkbox()
            && last.checkbox_group.is_none()
            && last.label.as_deref().map_or(true, |l| l.trim().is_empty());
        if bare {
            *last = Cell::input("");
        }
    }
    row
}
