//! Outcome-block tables.
//!
//! Rows are folded through a [`Scan`] accumulator. A block title opens a new
//! block; header material inside a block is dropped and re-synthesized when
//! the block is flushed, so every block comes out as
//! title, preamble, header, subheader, data.

use super::options::{CanonicalOptions, Labels};
use super::patterns::{Pattern, PatternSet};
use super::rules::{classify_outcome_row, RowShape, RowView};
use super::text::{collapse_whitespace, fold};
use crate::model::{Cell, CellVariant, InlineRun, Row, TableSection};

const OUTCOME_OPTIONS: [&str; 3] = ["cumple", "no_cumple", "no_aplica"];

struct Ctx<'a> {
    table: &'a TableSection,
    patterns: &'a PatternSet,
    labels: &'a Labels,
    insert_detectors: bool,
}

struct Block {
    anchor: String,
    title: String,
    toggle: bool,
    implicit: bool,
    preamble: Vec<Row>,
    body: Vec<Row>,
}

impl Block {
    fn implicit(ctx: &Ctx<'_>) -> Self {
        let raw = ctx.table.headers.first().map(String::as_str).unwrap_or("");
        Self {
            anchor: format!("{}_title", ctx.table.id),
            title: clean_title(raw, ctx),
            toggle: false,
            implicit: true,
            preamble: Vec::new(),
            body: Vec::new(),
        }
    }
}

struct Scan {
    out: Vec<Row>,
    block: Option<Block>,
    flushed: usize,
}

impl Scan {
    fn start(ctx: &Ctx<'_>) -> Self {
        let declared = declares_block(ctx.table, ctx.patterns);
        Self {
            out: Vec::with_capacity(ctx.table.rows.len() + 3),
            block: declared.then(|| Block::implicit(ctx)),
            flushed: 0,
        }
    }

    fn step(mut self, row: &Row, shape: RowShape, ctx: &Ctx<'_>) -> Self {
        match shape {
            RowShape::Blank => {}
            RowShape::DetectorSelector => match self.block.as_mut() {
                Some(block) if block.body.is_empty() => block.preamble.push(row.clone()),
                Some(block) => block.body.push(row.clone()),
                None => self.out.push(row.clone()),
            },
            RowShape::Header | RowShape::Subheader | RowShape::CombinedHeader => {
                if self.block.is_none() {
                    self.block = Some(Block::implicit(ctx));
                }
            }
            RowShape::BlockTitle { title_cell, toggle } => {
                let raw = row
                    .cells
                    .get(title_cell)
                    .map(Cell::display_text)
                    .unwrap_or_default();
                let title = clean_title(&raw, ctx);

                if let Some(block) = self.block.as_mut() {
                    if block.implicit && block.body.is_empty() && fold(&block.title) == fold(&title)
                    {
                        block.anchor = row.id.clone();
                        block.title = title;
                        block.toggle = toggle.unwrap_or(false);
                        block.implicit = false;
                        return self;
                    }
                }
                self.flush(ctx);
                self.block = Some(Block {
                    anchor: row.id.clone(),
                    title,
                    toggle: toggle.unwrap_or(false),
                    implicit: false,
                    preamble: Vec::new(),
                    body: Vec::new(),
                });
            }
            RowShape::Data { outcomes } => match self.block.as_mut() {
                Some(block) => block.body.push(data_row(row, outcomes, ctx)),
                None => self.out.push(row.clone()),
            },
            RowShape::Unrecognized => match self.block.as_mut() {
                Some(block) => block.body.push(row.clone()),
                None => self.out.push(row.clone()),
            },
        }
        self
    }

    fn flush(&mut self, ctx: &Ctx<'_>) {
        let Some(mut block) = self.block.take() else {
            return;
        };
        if block.implicit && block.body.is_empty() && block.preamble.is_empty() {
            // header material that never led anywhere
            return;
        }
        if self.flushed == 0 && ctx.insert_detectors {
            block.preamble.insert(0, detector_row(ctx));
        }

        let labels = ctx.labels;
        self.out.push(title_row(&block, labels));
        self.out.append(&mut block.preamble);
        self.out.push(Row::new(
            format!("{}_header", block.anchor),
            vec![
                Cell::text(&labels.parameter).subheader(),
                Cell::text(&labels.result).subheader(),
                Cell::text(&labels.specification).subheader(),
                Cell::text(&labels.conclusions).colspan(3).subheader(),
            ],
        ));
        self.out.push(Row::new(
            format!("{}_subheader", block.anchor),
            vec![
                Cell::empty().variant(CellVariant::Note),
                Cell::empty().variant(CellVariant::Note),
                Cell::empty().variant(CellVariant::Note),
                Cell::text(&labels.complies).subheader(),
                Cell::text(&labels.not_complies).subheader(),
                Cell::text(&labels.not_applicable).subheader(),
            ],
        ));
        self.out.append(&mut block.body);
        self.flushed += 1;
    }

    fn finish(mut self, ctx: &Ctx<'_>) -> Vec<Row> {
        self.flush(ctx);
        self.out.retain(|row| !RowView::new(row).is_blank());
        self.out
    }
}

/// Rewrite an outcome-block table into canonical form.
pub(crate) fn canonicalize_outcome(
    table: &TableSection,
    patterns: &PatternSet,
    options: &CanonicalOptions,
) -> TableSection {
    let ctx = Ctx {
        table,
        patterns,
        labels: &options.labels,
        insert_detectors: mentions_detectors(table, patterns)
            && !table.rows.iter().any(|r| r.cells.iter().any(|c| !c.inline.is_empty())),
    };

    let scan = table.rows.iter().fold(Scan::start(&ctx), |scan, row| {
        let (shape, rule) = classify_outcome_row(&RowView::new(row), patterns);
        log::debug!("{}: row {} matched {}", table.id, row.id, rule);
        scan.step(row, shape, &ctx)
    });
    let rows = scan.finish(&ctx);

    TableSection {
        headers: Vec::new(),
        rows,
        column_widths: if options.column_widths.is_empty() {
            table.column_widths.clone()
        } else {
            Some(options.column_widths.clone())
        },
        ..table.clone()
    }
}

/// A two-entry header band whose second entry is the client specification
/// marker declares a single block titled by the first entry.
pub(crate) fn declares_block(table: &TableSection, patterns: &PatternSet) -> bool {
    table.headers.len() == 2 && patterns.matches_raw(Pattern::ClientSpec, &table.headers[1])
}

fn mentions_detectors(table: &TableSection, patterns: &PatternSet) -> bool {
    let haystack = table
        .headers
        .iter()
        .map(|h| fold(h))
        .chain(
            table
                .rows
                .iter()
                .flat_map(|r| &r.cells)
                .map(|c| fold(c.value.as_text())),
        )
        .collect::<Vec<_>>()
        .join(" ");

    if patterns.is_match(Pattern::DetectorPhrase, &haystack) {
        return true;
    }
    let keys = patterns.detector_keys();
    !keys.is_empty() && keys.iter().all(|k| haystack.contains(k.as_str()))
}

fn clean_title(raw: &str, ctx: &Ctx<'_>) -> String {
    let stripped = ctx.patterns.strip(Pattern::ClientSpec, raw);
    let stripped = ctx.patterns.strip_detector_suffix(&stripped);
    let title = collapse_whitespace(&stripped);
    if title.is_empty() {
        ctx.labels.default_title.clone()
    } else {
        title
    }
}

/// Lay a title with a colon out on two lines.
fn two_lines(title: &str) -> String {
    match title.split_once(':') {
        Some((head, tail)) if !tail.trim().is_empty() => {
            format!("{}:\n{}", head.trim(), tail.trim())
        }
        _ => title.to_string(),
    }
}

fn title_row(block: &Block, labels: &Labels) -> Row {
    Row::new(
        block.anchor.clone(),
        vec![
            Cell::text(two_lines(&block.title)).colspan(4).header(),
            Cell::checkbox(block.toggle)
                .colspan(2)
                .header()
                .labeled(&labels.client_spec)
                .grouped(format!("client_spec_{}", block.anchor), "ver_especificacion"),
        ],
    )
}

fn data_row(row: &Row, outcomes: [bool; 3], ctx: &Ctx<'_>) -> Row {
    let text = |i: usize| {
        row.cells
            .get(i)
            .map(|c| c.text_value().to_string())
            .unwrap_or_default()
    };
    let result = text(1);
    let group = format!("{}_{}_outcome", ctx.table.id, row.id);
    // radio semantics: at most one outcome stays selected
    let selected = outcomes.iter().position(|&o| o);

    let mut cells = vec![
        Cell::text(text(0)),
        if result.is_empty() {
            Cell::input("")
        } else {
            Cell::text(result)
        },
        Cell::text(text(2)).read_only(),
    ];
    cells.extend(
        OUTCOME_OPTIONS
            .iter()
            .enumerate()
            .map(|(i, option)| Cell::checkbox(selected == Some(i)).grouped(&group, *option)),
    );
    Row::new(row.id.clone(), cells)
}

fn detector_row(ctx: &Ctx<'_>) -> Row {
    let group = format!("{}_detectors", ctx.table.id);
    let runs = ctx
        .patterns
        .detectors()
        .iter()
        .zip(ctx.patterns.detector_keys())
        .flat_map(|(name, key)| {
            [
                InlineRun::Text { text: name.clone() },
                InlineRun::Checkbox {
                    group_id: group.clone(),
                    option: key.clone(),
                    label: None,
                },
            ]
        })
        .collect();
    Row::new(
        group,
        vec![Cell::empty().colspan(6).subheader().with_inline(runs)],
    )
}
