//! Plain text page preview.
//!
//! Tables are drawn from their logical grid so merged cells show where they
//! sit: `<` marks a column taken by a colSpan, `^` a row taken by a rowSpan.

use crate::grid::{resolve_table, Slot};
use crate::model::{Cell, CellKind, Document, Page, Section, TableSection};

const MAX_COLUMN_WIDTH: usize = 28;

/// Render a paginated plain-text preview.
///
/// With no pages, the document is rendered as one unbroken flow.
pub fn to_text(doc: &Document, pages: &[Page]) -> String {
    let mut output = String::new();

    if pages.is_empty() {
        for section in &doc.sections {
            render_section(&mut output, section);
        }
        return output.trim_end().to_string();
    }

    for page in pages {
        output.push_str(&format!(
            "==== Page {} ({:.1}{}) ====\n\n",
            page.number,
            page.height,
            if page.overflow { ", overflow" } else { "" }
        ));
        for section in page.sections.iter().filter_map(|&i| doc.sections.get(i)) {
            render_section(&mut output, section);
        }
    }

    output.trim_end().to_string()
}

fn render_section(output: &mut String, section: &Section) {
    match section {
        Section::Table(table) => {
            if let Some(title) = table.title.as_deref().filter(|t| !t.trim().is_empty()) {
                output.push_str(title.trim());
                output.push('\n');
            }
            output.push_str(&table_to_text(table));
        }
        other => output.push_str(&other.plain_text()),
    }
    output.push_str("\n\n");
}

/// Render one table as aligned text columns.
pub fn table_to_text(table: &TableSection) -> String {
    let grid = resolve_table(table);
    let total_cols = grid.total_cols();

    let mut lines: Vec<Vec<String>> = Vec::with_capacity(grid.row_count() + 1);
    if !table.headers.is_empty() {
        let mut header: Vec<String> = table.headers.iter().map(|h| squash(h)).collect();
        header.resize(total_cols.max(header.len()), String::new());
        lines.push(header);
    }
    for row in 0..grid.row_count() {
        let cells = grid
            .row_slots(row)
            .iter()
            .map(|slot| match *slot {
                Slot::Empty => String::new(),
                Slot::Occupied { top_left: false, .. } => "<".to_string(),
                Slot::Occupied { cell, .. } => grid
                    .resolve_cell(&table.rows, cell)
                    .map(cell_text)
                    .unwrap_or_default(),
                Slot::Covered { .. } => "^".to_string(),
            })
            .collect();
        lines.push(cells);
    }

    let columns = lines.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            lines
                .iter()
                .filter_map(|l| l.get(col))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    lines
        .iter()
        .map(|line| {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(col, &width)| pad(line.get(col).map_or("", String::as_str), width))
                .collect();
            format!("| {} |", cells.join(" | "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn cell_text(cell: &Cell) -> String {
    match cell.kind {
        CellKind::Checkbox => {
            let mark = if cell.is_checked() { "[x]" } else { "[ ]" };
            match cell.display_text() {
                label if label.is_empty() => mark.to_string(),
                label => format!("{} {}", mark, squash(&label)),
            }
        }
        CellKind::Input if cell.text_value().is_empty() => "____".to_string(),
        _ => squash(&cell.display_text()),
    }
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}
