//! Table types.

use serde::{Deserialize, Serialize};

/// A table section: header band, rows of cells, optional layout hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSection {
    /// Stable section identifier
    pub id: String,

    /// Optional section title (rendered above the table)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Header band; empty means the structure lives in the body rows
    #[serde(default)]
    pub headers: Vec<String>,

    /// Body rows
    #[serde(default)]
    pub rows: Vec<Row>,

    /// Column width specs (e.g. "38%", "60mm")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<Vec<String>>,

    /// Caption drawn inside the table frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Force a page break before this section
    #[serde(default, skip_serializing_if = "is_false")]
    pub page_break_before: bool,
}

impl TableSection {
    /// Create an empty table with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            headers: Vec::new(),
            rows: Vec::new(),
            column_widths: None,
            caption: None,
            page_break_before: false,
        }
    }

    /// Set the header band and return self.
    pub fn with_headers<S: Into<String>>(mut self, headers: impl IntoIterator<Item = S>) -> Self {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Append a row and return self.
    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Set all rows and return self.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Request a page break before this table.
    pub fn with_page_break(mut self) -> Self {
        self.page_break_before = true;
        self
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| c.is_merged())
    }

    /// Find a row by id.
    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        if !self.headers.is_empty() {
            lines.push(self.headers.join("\t"));
        }
        lines.extend(self.rows.iter().map(Row::plain_text));
        lines.join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Stable row id (persistence key for filled-in values)
    pub id: String,

    /// Cells in the row
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Row {
    /// Create a new row with cells.
    pub fn new(id: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            id: id.into(),
            cells,
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(
        id: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(id, values.into_iter().map(Cell::text).collect())
    }

    /// Sum of the column spans of the row's cells.
    pub fn span_width(&self) -> usize {
        self.cells.iter().map(|c| c.col_span() as usize).sum()
    }

    /// Get the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.display_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// Kind of a table cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Static text
    #[default]
    Text,
    /// Boolean checkbox
    Checkbox,
    /// Free-text field to fill in
    Input,
}

/// Structural styling of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellVariant {
    /// Regular body cell
    #[default]
    Normal,
    /// Dark header band (block titles)
    Header,
    /// Column labels
    Subheader,
    /// Small-print note
    Note,
}

/// Value held by a cell: text for text/input cells, a flag for checkboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Boolean value (checkbox state)
    Bool(bool),
    /// Text value
    Text(String),
}

impl CellValue {
    /// Text content, empty for booleans.
    pub fn as_text(&self) -> &str {
        match self {
            CellValue::Text(s) => s,
            CellValue::Bool(_) => "",
        }
    }

    /// Checked state; only `Bool(true)` counts.
    pub fn is_true(&self) -> bool {
        matches!(self, CellValue::Bool(true))
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

/// Radio-style checkbox group: at most one option per group is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxGroup {
    /// Group id shared by mutually exclusive checkboxes
    pub group_id: String,
    /// This checkbox's option key
    pub option: String,
}

impl CheckboxGroup {
    /// Create a group membership.
    pub fn new(group_id: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            option: option.into(),
        }
    }
}

/// A run of inline content packed into one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InlineRun {
    /// Plain text
    Text {
        /// Text content
        text: String,
    },
    /// Inline checkbox
    Checkbox {
        /// Group id
        #[serde(rename = "groupId")]
        group_id: String,
        /// Option key
        option: String,
        /// Optional label next to the box
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Cell kind
    #[serde(rename = "type", default)]
    pub kind: CellKind,

    /// Cell value
    #[serde(default, skip_serializing_if = "is_empty_value")]
    pub value: CellValue,

    /// Number of columns this cell spans
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub col_span: u32,

    /// Number of rows this cell spans
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub row_span: u32,

    /// Structural variant
    #[serde(default, skip_serializing_if = "is_normal")]
    pub variant: CellVariant,

    /// Radio group membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox_group: Option<CheckboxGroup>,

    /// Label rendered next to a checkbox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Inline text/checkbox runs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline: Vec<InlineRun>,

    /// Value may not be edited
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
}

impl Cell {
    fn with_kind(kind: CellKind, value: CellValue) -> Self {
        Self {
            kind,
            value,
            col_span: 1,
            row_span: 1,
            variant: CellVariant::Normal,
            checkbox_group: None,
            label: None,
            inline: Vec::new(),
            read_only: false,
        }
    }

    /// Create a text cell.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(CellKind::Text, CellValue::Text(text.into()))
    }

    /// Create an empty text cell.
    pub fn empty() -> Self {
        Self::text("")
    }

    /// Create a checkbox cell.
    pub fn checkbox(checked: bool) -> Self {
        Self::with_kind(CellKind::Checkbox, CellValue::Bool(checked))
    }

    /// Create an input cell.
    pub fn input(value: impl Into<String>) -> Self {
        Self::with_kind(CellKind::Input, CellValue::Text(value.into()))
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: u32) -> Self {
        self.col_span = span;
        self
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: u32) -> Self {
        self.row_span = span;
        self
    }

    /// Set variant and return self.
    pub fn variant(mut self, variant: CellVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Shorthand for the header variant.
    pub fn header(self) -> Self {
        self.variant(CellVariant::Header)
    }

    /// Shorthand for the subheader variant.
    pub fn subheader(self) -> Self {
        self.variant(CellVariant::Subheader)
    }

    /// Put the cell into a checkbox group and return self.
    pub fn grouped(mut self, group_id: impl Into<String>, option: impl Into<String>) -> Self {
        self.checkbox_group = Some(CheckboxGroup::new(group_id, option));
        self
    }

    /// Set the checkbox label and return self.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set inline runs and return self.
    pub fn with_inline(mut self, runs: Vec<InlineRun>) -> Self {
        self.inline = runs;
        self
    }

    /// Mark the cell read-only and return self.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Column span, never less than 1.
    pub fn col_span(&self) -> u32 {
        self.col_span.max(1)
    }

    /// Row span, never less than 1.
    pub fn row_span(&self) -> u32 {
        self.row_span.max(1)
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.col_span() > 1 || self.row_span() > 1
    }

    /// Check if this is a checkbox cell.
    pub fn is_checkbox(&self) -> bool {
        self.kind == CellKind::Checkbox
    }

    /// Checkbox state; false for non-checkbox cells.
    pub fn is_checked(&self) -> bool {
        self.is_checkbox() && self.value.is_true()
    }

    /// Text of a text or input cell, trimmed. Checkboxes have none.
    pub fn text_value(&self) -> &str {
        match self.kind {
            CellKind::Text | CellKind::Input => self.value.as_text().trim(),
            CellKind::Checkbox => "",
        }
    }

    /// Visible text: the value for text/input cells, the label for
    /// checkboxes, plus any inline text runs.
    pub fn display_text(&self) -> String {
        let base = match self.kind {
            CellKind::Checkbox => self.label.as_deref().unwrap_or(""),
            _ => self.value.as_text(),
        };
        if self.inline.is_empty() {
            return base.trim().to_string();
        }
        let inline = self
            .inline
            .iter()
            .filter_map(|run| match run {
                InlineRun::Text { text } => Some(text.as_str()),
                InlineRun::Checkbox { label, .. } => label.as_deref(),
            })
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        [base.trim(), inline.as_str()]
            .iter()
            .filter(|t| !t.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Blank text or input, or an unchecked box without a label.
    pub fn is_blank(&self) -> bool {
        match self.kind {
            CellKind::Checkbox => {
                !self.value.is_true()
                    && self.label.as_deref().map_or(true, |l| l.trim().is_empty())
            }
            CellKind::Text | CellKind::Input => {
                self.value.as_text().trim().is_empty() && self.inline.is_empty()
            }
        }
    }
}

fn one() -> u32 {
    1
}

fn is_one(v: &u32) -> bool {
    *v == 1
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_normal(v: &CellVariant) -> bool {
    *v == CellVariant::Normal
}

fn is_empty_value(v: &CellValue) -> bool {
    matches!(v, CellValue::Text(s) if s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = TableSection::new("sec_1");
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert!(!table.has_merged_cells());
    }

    #[test]
    fn test_row_span_width() {
        let row = Row::new(
            "r1",
            vec![Cell::text("Title").colspan(4), Cell::checkbox(false).colspan(2)],
        );
        assert_eq!(row.span_width(), 6);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_zero_span_reads_as_one() {
        let cell = Cell::text("x").colspan(0).rowspan(0);
        assert_eq!(cell.col_span(), 1);
        assert_eq!(cell.row_span(), 1);
        assert!(!cell.is_merged());
    }

    #[test]
    fn test_cell_text_and_blank() {
        assert_eq!(Cell::text("  Ripple ").text_value(), "Ripple");
        assert!(Cell::text("   ").is_blank());
        assert!(Cell::checkbox(false).is_blank());
        assert!(!Cell::checkbox(true).is_blank());
        assert!(!Cell::checkbox(false).labeled("No cumple").is_blank());
        assert_eq!(Cell::checkbox(true).text_value(), "");
        assert_eq!(
            Cell::checkbox(false).labeled("No aplica").display_text(),
            "No aplica"
        );
    }

    #[test]
    fn test_cell_json_shape() {
        let json = r#"{"type":"checkbox","value":true,"colSpan":2,
            "checkboxGroup":{"groupId":"g","option":"cumple"}}"#;
        let cell: Cell = serde_json::from_str(json).unwrap();
        assert_eq!(cell.kind, CellKind::Checkbox);
        assert!(cell.is_checked());
        assert_eq!(cell.col_span, 2);
        assert_eq!(cell.row_span, 1);
        assert_eq!(cell.checkbox_group.as_ref().unwrap().group_id, "g");

        let out = serde_json::to_string(&Cell::text("a")).unwrap();
        assert_eq!(out, r#"{"type":"text","value":"a"}"#);
    }

    #[test]
    fn test_inline_runs_json() {
        let json = r#"{"type":"text","inline":[
            {"kind":"text","text":"VWD"},
            {"kind":"checkbox","groupId":"d","option":"vwd"}]}"#;
        let cell: Cell = serde_json::from_str(json).unwrap();
        assert_eq!(cell.inline.len(), 2);
        assert_eq!(cell.display_text(), "VWD");
        assert!(!cell.is_blank());
    }
}
