//! Row classification rules.
//!
//! Each family has an ordered list of named rules. A row is tested against
//! the rules top to bottom and takes the shape returned by the first rule
//! that matches; rows no rule recognizes are passed through untouched.

use super::patterns::{Pattern, PatternSet};
use super::text::fold;
use crate::model::{Cell, CellKind, CellVariant, Row};

/// A row with its cells' folded text precomputed.
#[derive(Debug)]
pub struct RowView<'a> {
    /// Source row
    pub row: &'a Row,
    /// Folded visible text of each cell (checkbox labels included)
    pub texts: Vec<String>,
}

impl<'a> RowView<'a> {
    /// Build a view over a row.
    pub fn new(row: &'a Row) -> Self {
        let texts = row
            .cells
            .iter()
            .map(|c| fold(&c.display_text()))
            .collect();
        Self { row, texts }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.row.cells.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.row.cells.is_empty()
    }

    /// Cell by index.
    pub fn cell(&self, i: usize) -> Option<&'a Cell> {
        self.row.cells.get(i)
    }

    /// Folded text of a cell; empty when out of range.
    pub fn text(&self, i: usize) -> &str {
        self.texts.get(i).map(String::as_str).unwrap_or("")
    }

    /// Some cell's text matches the pattern.
    pub fn any(&self, patterns: &PatternSet, pattern: Pattern) -> bool {
        self.texts.iter().any(|t| patterns.is_match(pattern, t))
    }

    /// The last `n` cells are all checkboxes.
    pub fn checkbox_tail(&self, n: usize) -> bool {
        self.len() >= n
            && self.row.cells[self.len() - n..]
                .iter()
                .all(Cell::is_checkbox)
    }

    /// Some cell carries inline runs.
    pub fn has_inline(&self) -> bool {
        self.row.cells.iter().any(|c| !c.inline.is_empty())
    }

    /// Some cell uses the header variant.
    pub fn has_header_variant(&self) -> bool {
        self.row
            .cells
            .iter()
            .any(|c| c.variant == CellVariant::Header)
    }

    /// All text blank, all checkboxes unchecked, no inline runs and no
    /// header styling.
    pub fn is_blank(&self) -> bool {
        !self.has_header_variant() && !self.has_inline() && self.row.cells.iter().all(Cell::is_blank)
    }
}

/// A named classification rule.
pub struct Rule<S> {
    /// Rule name, reported in debug logs
    pub name: &'static str,
    /// Predicate returning the recognized shape
    pub apply: fn(&RowView<'_>, &PatternSet) -> Option<S>,
}

/// Run rules in order; the first match wins.
pub fn classify<S>(
    rules: &[Rule<S>],
    view: &RowView<'_>,
    patterns: &PatternSet,
) -> Option<(S, &'static str)> {
    rules
        .iter()
        .find_map(|rule| (rule.apply)(view, patterns).map(|shape| (shape, rule.name)))
}

// ============================================================================
// Outcome-block family
// ============================================================================

/// Shape of a row in an outcome-block table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowShape {
    /// Nothing but blank cells
    Blank,
    /// Inline detector checkboxes
    DetectorSelector,
    /// Header and outcome markers squeezed into one six-cell row
    CombinedHeader,
    /// Parameter / Result / Specification / Conclusions
    Header,
    /// Complies / Does not comply / Not applicable
    Subheader,
    /// Start of a new block
    BlockTitle {
        /// Index of the cell holding the title text
        title_cell: usize,
        /// State of the client specification toggle, if the row has one
        toggle: Option<bool>,
    },
    /// Data row: parameter, result, specification and three outcomes
    Data {
        /// Cumple / No cumple / No aplica
        outcomes: [bool; 3],
    },
    /// Not recognized; passed through
    Unrecognized,
}

/// Ordered rules for outcome-block tables.
pub const OUTCOME_RULES: &[Rule<RowShape>] = &[
    Rule {
        name: "blank",
        apply: blank,
    },
    Rule {
        name: "detector_selector",
        apply: detector_selector,
    },
    Rule {
        name: "combined_header",
        apply: combined_header,
    },
    Rule {
        name: "header",
        apply: header,
    },
    Rule {
        name: "subheader",
        apply: subheader,
    },
    Rule {
        name: "block_title",
        apply: block_title,
    },
    Rule {
        name: "data_with_outcomes",
        apply: data_with_outcomes,
    },
    Rule {
        name: "padded_data",
        apply: padded_data,
    },
    Rule {
        name: "short_data",
        apply: short_data,
    },
];

/// Classify a row of an outcome-block table.
pub fn classify_outcome_row(view: &RowView<'_>, patterns: &PatternSet) -> (RowShape, &'static str) {
    classify(OUTCOME_RULES, view, patterns).unwrap_or((RowShape::Unrecognized, "unrecognized"))
}

fn blank(view: &RowView<'_>, _: &PatternSet) -> Option<RowShape> {
    view.is_blank().then_some(RowShape::Blank)
}

fn detector_selector(view: &RowView<'_>, _: &PatternSet) -> Option<RowShape> {
    view.has_inline().then_some(RowShape::DetectorSelector)
}

fn has_outcome_markers(view: &RowView<'_>, patterns: &PatternSet) -> bool {
    view.any(patterns, Pattern::NotComplies) && view.any(patterns, Pattern::NotApplicable)
}

fn combined_header(view: &RowView<'_>, patterns: &PatternSet) -> Option<RowShape> {
    let matched = view.len() == 6
        && view.any(patterns, Pattern::Conclusions)
        && (view.any(patterns, Pattern::NotComplies) || view.any(patterns, Pattern::NotApplicable))
        && !view.checkbox_tail(3);
    matched.then_some(RowShape::CombinedHeader)
}

fn header(view: &RowView<'_>, patterns: &PatternSet) -> Option<RowShape> {
    (view.len() == 4 && view.any(patterns, Pattern::Conclusions)).then_some(RowShape::Header)
}

fn subheader(view: &RowView<'_>, patterns: &PatternSet) -> Option<RowShape> {
    if !has_outcome_markers(view, patterns) {
        return None;
    }
    let three = view.len() == 3;
    let padded = view.len() == 6
        && view.row.cells[..3].iter().all(Cell::is_blank)
        && !view.checkbox_tail(3);
    (three || padded).then_some(RowShape::Subheader)
}

fn is_header_keyword(text: &str, patterns: &PatternSet) -> bool {
    [Pattern::Parameter, Pattern::Result, Pattern::Conclusions]
        .iter()
        .any(|&p| patterns.is_match(p, text))
}

/// Title row as written by the canonicalizer: a wide header cell and the
/// client specification toggle.
fn canonical_title(view: &RowView<'_>) -> Option<RowShape> {
    let (first, toggle) = match view.row.cells.as_slice() {
        [first, toggle] => (first, toggle),
        _ => return None,
    };
    let matched = !first.is_checkbox()
        && first.col_span() >= 4
        && first.variant == CellVariant::Header
        && toggle.is_checkbox()
        && toggle
            .checkbox_group
            .as_ref()
            .is_some_and(|g| g.group_id.starts_with("client_spec_"));
    matched.then(|| RowShape::BlockTitle {
        title_cell: 0,
        toggle: Some(toggle.is_checked()),
    })
}

fn block_title(view: &RowView<'_>, patterns: &PatternSet) -> Option<RowShape> {
    if let Some(shape) = canonical_title(view) {
        return Some(shape);
    }
    let first = view.cell(0)?;
    if first.is_checkbox() || is_header_keyword(view.text(0), patterns) {
        return None;
    }
    let wide = first.col_span() >= 4 || first.variant == CellVariant::Header;

    match view.len() {
        1 => {
            let matched = !view.text(0).is_empty()
                && first.variant != CellVariant::Note
                && (wide || patterns.is_match(Pattern::ClientSpec, view.text(0)));
            matched.then_some(RowShape::BlockTitle {
                title_cell: 0,
                toggle: None,
            })
        }
        2 => {
            let second = view.cell(1)?;
            let marker = patterns.is_match(Pattern::ClientSpec, view.text(1));
            let matched = (second.is_checkbox() || marker) && (wide || marker);
            matched.then(|| RowShape::BlockTitle {
                title_cell: 0,
                toggle: second.is_checkbox().then(|| second.is_checked()),
            })
        }
        _ => None,
    }
}

fn checkbox_or_blank(cell: &Cell) -> bool {
    cell.is_checkbox() || (cell.kind == CellKind::Text && cell.is_blank())
}

fn outcomes_from(cells: &[Cell]) -> [bool; 3] {
    let mut outcomes = [false; 3];
    for (slot, cell) in outcomes.iter_mut().zip(cells) {
        *slot = cell.is_checked();
    }
    outcomes
}

fn data_with_outcomes(view: &RowView<'_>, _: &PatternSet) -> Option<RowShape> {
    if view.len() < 6 || !view.checkbox_tail(3) {
        return None;
    }
    Some(RowShape::Data {
        outcomes: outcomes_from(&view.row.cells[view.len() - 3..]),
    })
}

fn padded_data(view: &RowView<'_>, _: &PatternSet) -> Option<RowShape> {
    if view.len() != 6 || !view.row.cells[3..].iter().all(checkbox_or_blank) {
        return None;
    }
    Some(RowShape::Data {
        outcomes: outcomes_from(&view.row.cells[3..]),
    })
}

fn short_data(view: &RowView<'_>, _: &PatternSet) -> Option<RowShape> {
    if view.is_empty() || view.len() > 5 {
        return None;
    }
    let tail = view.row.cells.get(3..).unwrap_or(&[]);
    if !tail.iter().all(checkbox_or_blank) {
        return None;
    }
    Some(RowShape::Data {
        outcomes: outcomes_from(tail),
    })
}

// ============================================================================
// Continuation-row family
// ============================================================================

/// Shape of a row in a descriptive (continuation-row) table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationShape {
    /// Starts with an instruction code and owns the rows below it
    Anchor,
    /// Already reduced to parameter / specification / new specification
    Reduced,
    /// Leading cells blank, content further right
    Standard,
    /// Parameter label and specification value shifted into the leading cells
    Misaligned,
    /// Not recognized; passed through
    Other,
}

impl ContinuationShape {
    /// Row belongs to the run owned by a preceding anchor.
    pub fn continues(self) -> bool {
        matches!(
            self,
            ContinuationShape::Reduced | ContinuationShape::Standard | ContinuationShape::Misaligned
        )
    }
}

/// Ordered rules for descriptive tables.
pub const CONTINUATION_RULES: &[Rule<ContinuationShape>] = &[
    Rule {
        name: "anchor",
        apply: anchor,
    },
    Rule {
        name: "reduced",
        apply: reduced,
    },
    Rule {
        name: "standard_continuation",
        apply: standard_continuation,
    },
    Rule {
        name: "misaligned_continuation",
        apply: misaligned_continuation,
    },
];

/// Classify a row of a descriptive table.
pub fn classify_continuation_row(
    view: &RowView<'_>,
    patterns: &PatternSet,
) -> (ContinuationShape, &'static str) {
    classify(CONTINUATION_RULES, view, patterns).unwrap_or((ContinuationShape::Other, "other"))
}

fn anchor(view: &RowView<'_>, patterns: &PatternSet) -> Option<ContinuationShape> {
    let matched = view.len() >= 2 && patterns.is_match(Pattern::InstructionCode, view.text(0));
    matched.then_some(ContinuationShape::Anchor)
}

fn reduced(view: &RowView<'_>, _: &PatternSet) -> Option<ContinuationShape> {
    (view.len() == 3).then_some(ContinuationShape::Reduced)
}

fn standard_continuation(view: &RowView<'_>, _: &PatternSet) -> Option<ContinuationShape> {
    if view.len() < 4 {
        return None;
    }
    let leading_blank = view.row.cells[..2].iter().all(Cell::is_blank);
    let meaningful = view.row.cells[2].text_value().chars().count() >= 2;
    (leading_blank && meaningful).then_some(ContinuationShape::Standard)
}

fn misaligned_continuation(view: &RowView<'_>, patterns: &PatternSet) -> Option<ContinuationShape> {
    if view.len() < 4 {
        return None;
    }
    let label = view.text(0);
    let matched = label.chars().count() >= 3
        && patterns.is_match(Pattern::ParameterLabel, label)
        && !patterns.is_match(Pattern::InstructionCode, label)
        && patterns.is_match(Pattern::SpecificationValue, view.text(1));
    matched.then_some(ContinuationShape::Misaligned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(row: &Row) -> RowShape {
        classify_outcome_row(&RowView::new(row), &PatternSet::default()).0
    }

    fn cont(row: &Row) -> ContinuationShape {
        classify_continuation_row(&RowView::new(row), &PatternSet::default()).0
    }

    // ========================================================================
    // Outcome rules
    // ========================================================================

    #[test]
    fn test_blank_row() {
        let row = Row::new("r", vec![Cell::text(" "), Cell::checkbox(false)]);
        assert_eq!(shape(&row), RowShape::Blank);
        assert_eq!(shape(&Row::new("r", vec![])), RowShape::Blank);

        let styled = Row::new("r", vec![Cell::text("").header()]);
        assert_ne!(shape(&styled), RowShape::Blank);
    }

    #[test]
    fn test_header_rows() {
        let header = Row::from_strings("h", ["Parámetro", "Resultado", "Especificación", "Conclusiones"]);
        assert_eq!(shape(&header), RowShape::Header);

        let sub = Row::new(
            "s",
            vec![
                Cell::checkbox(false),
                Cell::checkbox(false).labeled("No cumple"),
                Cell::checkbox(false).labeled("No aplica"),
            ],
        );
        assert_eq!(shape(&sub), RowShape::Subheader);

        let padded = Row::from_strings("s", ["", "", "", "Cumple", "No cumple", "No aplica"]);
        assert_eq!(shape(&padded), RowShape::Subheader);

        let combined =
            Row::from_strings("c", ["Parámetro", "Resultado", "Especificación", "Conclusiones", "No cumple", "No aplica"]);
        assert_eq!(shape(&combined), RowShape::CombinedHeader);
    }

    #[test]
    fn test_block_titles() {
        let wide = Row::new("t", vec![Cell::text("Ripple Test").colspan(6)]);
        assert_eq!(
            shape(&wide),
            RowShape::BlockTitle {
                title_cell: 0,
                toggle: None
            }
        );

        let with_toggle = Row::new(
            "t",
            vec![
                Cell::text("Test de ruido").colspan(4),
                Cell::checkbox(true).labeled("Ver especificación del cliente"),
            ],
        );
        assert_eq!(
            shape(&with_toggle),
            RowShape::BlockTitle {
                title_cell: 0,
                toggle: Some(true)
            }
        );

        let marker_text = Row::from_strings("t", ["Linealidad", "VER ESPECIFICACION DEL CLIENTE"]);
        assert!(matches!(shape(&marker_text), RowShape::BlockTitle { toggle: None, .. }));

        let keyword = Row::new("t", vec![Cell::text("Resultados").colspan(6)]);
        assert_ne!(
            shape(&keyword),
            RowShape::BlockTitle {
                title_cell: 0,
                toggle: None
            }
        );

        let note = Row::new("n", vec![Cell::text("Nota").variant(CellVariant::Note).colspan(6)]);
        assert!(!matches!(shape(&note), RowShape::BlockTitle { .. }));
    }

    #[test]
    fn test_canonical_title_with_keyword() {
        let title = Row::new(
            "sec_20_title",
            vec![
                Cell::text("Resultados del test").colspan(4).header(),
                Cell::checkbox(false)
                    .colspan(2)
                    .header()
                    .labeled("Ver especificación\ndel cliente")
                    .grouped("client_spec_sec_20_title", "ver_especificacion"),
            ],
        );
        assert_eq!(
            shape(&title),
            RowShape::BlockTitle {
                title_cell: 0,
                toggle: Some(false)
            }
        );

        let ungrouped = Row::new(
            "t",
            vec![
                Cell::text("Parámetros").colspan(4).header(),
                Cell::checkbox(false).colspan(2),
            ],
        );
        assert!(!matches!(shape(&ungrouped), RowShape::BlockTitle { .. }));
    }

    #[test]
    fn test_data_rows() {
        let full = Row::new(
            "d",
            vec![
                Cell::text("Ruido"),
                Cell::text("0.01"),
                Cell::text("≤ 0.02"),
                Cell::checkbox(false),
                Cell::checkbox(true),
                Cell::checkbox(false),
            ],
        );
        assert_eq!(
            shape(&full),
            RowShape::Data {
                outcomes: [false, true, false]
            }
        );

        let padded = Row::new(
            "d",
            vec![
                Cell::text("Ruido"),
                Cell::text(""),
                Cell::text("≤ 0.02"),
                Cell::checkbox(true),
                Cell::text(""),
                Cell::text(""),
            ],
        );
        assert_eq!(
            shape(&padded),
            RowShape::Data {
                outcomes: [true, false, false]
            }
        );

        let short = Row::from_strings("d", ["Deriva", "", "≤ 5"]);
        assert_eq!(
            shape(&short),
            RowShape::Data {
                outcomes: [false; 3]
            }
        );
    }

    #[test]
    fn test_unrecognized_row() {
        let row = Row::from_strings("x", ["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(shape(&row), RowShape::Unrecognized);

        let text_tail = Row::from_strings("x", ["a", "b", "c", "d", "e", "f"]);
        assert_eq!(shape(&text_tail), RowShape::Unrecognized);
    }

    // ========================================================================
    // Continuation rules
    // ========================================================================

    #[test]
    fn test_anchor_and_continuations() {
        let anchor = Row::from_strings("a", ["QI7.0513", "Ruido", "Ruido ASTM", "≤ 0.02", ""]);
        assert_eq!(cont(&anchor), ContinuationShape::Anchor);

        let standard = Row::new(
            "c",
            vec![
                Cell::text(""),
                Cell::checkbox(false),
                Cell::text("Deriva"),
                Cell::text("≤ 5"),
                Cell::text(""),
            ],
        );
        assert_eq!(cont(&standard), ContinuationShape::Standard);

        let misaligned = Row::from_strings("m", ["Temperatura", "± 2 °C", "", ""]);
        assert_eq!(cont(&misaligned), ContinuationShape::Misaligned);

        let reduced = Row::from_strings("r", ["Deriva", "≤ 5", ""]);
        assert_eq!(cont(&reduced), ContinuationShape::Reduced);

        let other = Row::from_strings("o", ["Lámpara", "Encendida", "", ""]);
        assert_eq!(cont(&other), ContinuationShape::Other);
    }

    #[test]
    fn test_standard_needs_meaningful_text() {
        let row = Row::from_strings("c", ["", "", "x", "y"]);
        assert_eq!(cont(&row), ContinuationShape::Other);
    }

    #[test]
    fn test_rule_names() {
        let row = Row::from_strings("a", ["QI1.01", "Test"]);
        let (_, name) = classify_continuation_row(&RowView::new(&row), &PatternSet::default());
        assert_eq!(name, "anchor");
        assert!(OUTCOME_RULES.iter().any(|r| r.name == "block_title"));
    }
}
