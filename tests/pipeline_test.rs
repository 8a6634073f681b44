//! End-to-end layout tests.

use protolayout::canonical::TableFamily;
use protolayout::model::Section;
use protolayout::paginate::EstimatedHeight;
use protolayout::render::{to_json, JsonFormat};
use protolayout::{
    classify_table, layout, parse_file, parse_reader, CanonicalOptions, PageBudget, Protolayout,
};
use std::io::Write;
use tempfile::NamedTempFile;

const PROTOCOL: &str = r#"{
  "id": "hplc_1260",
  "name": "Protocolo HPLC 1260",
  "version": "3",
  "sections": [
    { "type": "text", "id": "intro", "title": "Alcance", "content": "Verificación operacional." },
    { "type": "checklist", "id": "prev", "items": [
      { "id": "i1", "label": "Equipo encendido", "required": true, "value": false }
    ]},
    { "type": "table", "id": "sec_18",
      "headers": ["Ripple Test", "Ver especificación del cliente"],
      "rows": [
        { "id": "r1", "cells": [
          { "type": "text", "value": "Ripple" }, { "type": "text", "value": "" },
          { "type": "text", "value": "≤ 0.1" }, { "type": "checkbox", "value": false },
          { "type": "checkbox", "value": false }, { "type": "checkbox", "value": false } ] }
      ] },
    { "type": "table", "id": "sec_8",
      "rows": [
        { "id": "a", "cells": [
          { "type": "text", "value": "QI7.0513" }, { "type": "text", "value": "Ruido" },
          { "type": "text", "value": "Ruido" }, { "type": "text", "value": "≤ 0.02" },
          { "type": "checkbox", "value": false } ] },
        { "id": "c", "cells": [
          { "type": "text", "value": "" }, { "type": "checkbox", "value": false },
          { "type": "text", "value": "Deriva" }, { "type": "text", "value": "≤ 5" },
          { "type": "checkbox", "value": false } ] }
      ] },
    { "type": "signatures", "id": "sign", "pageBreakBefore": true, "signatures": [
      { "id": "tech", "label": "Técnico", "role": "technician" }
    ]}
  ]
}"#;

fn write_protocol() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(PROTOCOL.as_bytes()).unwrap();
    file
}

#[test]
fn test_parse_file() {
    let file = write_protocol();
    let doc = parse_file(file.path()).unwrap();
    assert_eq!(doc.section_count(), 5);
    assert_eq!(doc.version.as_deref(), Some("3"));
    assert!(doc.sections[4].page_break_before());

    let tables: Vec<_> = doc.tables().map(classify_table).collect();
    assert_eq!(
        tables,
        vec![Some(TableFamily::OutcomeBlock), Some(TableFamily::Continuation)]
    );
}

#[test]
fn test_parse_reader() {
    let doc = parse_reader(PROTOCOL.as_bytes()).unwrap();
    assert_eq!(doc.id, "hplc_1260");
}

#[test]
fn test_layout_end_to_end() {
    let doc = parse_reader(PROTOCOL.as_bytes()).unwrap();
    let result = Protolayout::new()
        .with_options(CanonicalOptions::new().with_default_footnotes())
        .run(&doc, &EstimatedHeight::new());

    let ids: Vec<&str> = result.document.sections.iter().map(Section::id).collect();
    assert_eq!(
        ids,
        vec!["intro", "prev", "sec_18", "sec_8", "sec_8_footnotes", "sign"]
    );

    let flat: Vec<usize> = result.pages.iter().flat_map(|p| p.sections.clone()).collect();
    assert_eq!(flat, (0..6).collect::<Vec<_>>());
    let last = result.pages.last().unwrap();
    assert_eq!(last.sections, vec![5]);
    assert!(result.pages.len() >= 2);
    assert!(!result.has_diagnostics());

    let outcome = result.document.sections[2].as_table().unwrap();
    assert_eq!(outcome.rows.len(), 4);
}

#[test]
fn test_layout_reports_oversized_tables() {
    let doc = parse_reader(PROTOCOL.as_bytes()).unwrap();
    let measure = |s: &Section| -> f32 {
        if s.id() == "sec_8" {
            500.0
        } else {
            10.0
        }
    };
    let budget = PageBudget::new(200.0).unwrap();
    let result = layout(&doc, &measure, &budget, &CanonicalOptions::default().sequential());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind(), "oversized_section");
}

#[test]
fn test_layout_json() {
    let doc = parse_reader(PROTOCOL.as_bytes()).unwrap();
    let result = Protolayout::new().run(&doc, &EstimatedHeight::new());
    let json = to_json(&result, JsonFormat::Compact).unwrap();
    assert!(json.contains("\"pages\":[{\"number\":1"));
    assert!(json.contains("\"diagnostics\":[]"));

    let reparsed = protolayout::parse_str(&to_json(&result.document, JsonFormat::Pretty).unwrap())
        .unwrap();
    assert_eq!(reparsed, result.document);
}
