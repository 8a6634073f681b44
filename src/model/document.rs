//! Document-level types.

use super::TableSection;
use serde::{Deserialize, Serialize};

/// A structured technical document: an ordered list of sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document (template) identifier
    #[serde(default)]
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Template version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Sections in reading order
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: None,
            sections: Vec::new(),
        }
    }

    /// Add a section to the document.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Append a section and return self.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Get the number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Check if the document has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Find a section by id.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id() == id)
    }

    /// Iterate over table sections.
    pub fn tables(&self) -> impl Iterator<Item = &TableSection> {
        self.sections.iter().filter_map(Section::as_table)
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.sections
            .iter()
            .map(Section::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// A document section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Section {
    /// Free text block
    Text(TextSection),
    /// List of check items
    Checklist(ChecklistSection),
    /// Table
    Table(TableSection),
    /// Signature block
    Signatures(SignaturesSection),
}

impl Section {
    /// Stable section id.
    pub fn id(&self) -> &str {
        match self {
            Section::Text(s) => &s.id,
            Section::Checklist(s) => &s.id,
            Section::Table(s) => &s.id,
            Section::Signatures(s) => &s.id,
        }
    }

    /// Section title, if any.
    pub fn title(&self) -> Option<&str> {
        match self {
            Section::Text(s) => s.title.as_deref(),
            Section::Checklist(s) => s.title.as_deref(),
            Section::Table(s) => s.title.as_deref(),
            Section::Signatures(s) => s.title.as_deref(),
        }
    }

    /// Whether a page break is forced before this section.
    pub fn page_break_before(&self) -> bool {
        match self {
            Section::Text(s) => s.page_break_before,
            Section::Checklist(s) => s.page_break_before,
            Section::Table(s) => s.page_break_before,
            Section::Signatures(s) => s.page_break_before,
        }
    }

    /// Short name of the section kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Section::Text(_) => "text",
            Section::Checklist(_) => "checklist",
            Section::Table(_) => "table",
            Section::Signatures(_) => "signatures",
        }
    }

    /// Check if this is a table section.
    pub fn is_table(&self) -> bool {
        matches!(self, Section::Table(_))
    }

    /// Borrow the table, if this is a table section.
    pub fn as_table(&self) -> Option<&TableSection> {
        match self {
            Section::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Get plain text content of the section.
    pub fn plain_text(&self) -> String {
        let body = match self {
            Section::Text(s) => s.content.clone(),
            Section::Checklist(s) => s
                .items
                .iter()
                .map(|i| format!("[{}] {}", if i.value { "x" } else { " " }, i.label))
                .collect::<Vec<_>>()
                .join("\n"),
            Section::Table(t) => t.plain_text(),
            Section::Signatures(s) => s
                .signatures
                .iter()
                .map(|sig| format!("{} ({})", sig.label, sig.role))
                .collect::<Vec<_>>()
                .join("\n"),
        };
        match self.title() {
            Some(title) if !title.trim().is_empty() => format!("{}\n{}", title.trim(), body),
            _ => body,
        }
    }
}

impl From<TableSection> for Section {
    fn from(table: TableSection) -> Self {
        Section::Table(table)
    }
}

impl From<TextSection> for Section {
    fn from(text: TextSection) -> Self {
        Section::Text(text)
    }
}

/// Free text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSection {
    /// Section id
    pub id: String,
    /// Optional heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Text content
    #[serde(default)]
    pub content: String,
    /// Force a page break before this section
    #[serde(default, skip_serializing_if = "is_false")]
    pub page_break_before: bool,
}

impl TextSection {
    /// Create a text section.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            content: content.into(),
            page_break_before: false,
        }
    }

    /// Request a page break before this section.
    pub fn with_page_break(mut self) -> Self {
        self.page_break_before = true;
        self
    }
}

/// Checklist section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSection {
    /// Section id
    pub id: String,
    /// Optional heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Check items
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
    /// Force a page break before this section
    #[serde(default, skip_serializing_if = "is_false")]
    pub page_break_before: bool,
}

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Item id
    pub id: String,
    /// Item label
    pub label: String,
    /// Must be checked before sign-off
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Checked state
    #[serde(default, skip_serializing_if = "is_false")]
    pub value: bool,
}

/// Signature block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturesSection {
    /// Section id
    pub id: String,
    /// Optional heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Signature slots
    #[serde(default)]
    pub signatures: Vec<SignatureItem>,
    /// Force a page break before this section
    #[serde(default, skip_serializing_if = "is_false")]
    pub page_break_before: bool,
}

/// One signature slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureItem {
    /// Slot id
    pub id: String,
    /// Caption under the signature line
    pub label: String,
    /// Signer role
    pub role: String,
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Row};

    #[test]
    fn test_document_new() {
        let doc = Document::new("tpl", "HPLC");
        assert!(doc.is_empty());
        assert_eq!(doc.section_count(), 0);
    }

    #[test]
    fn test_section_accessors() {
        let table = TableSection::new("sec_2").with_page_break();
        let doc = Document::new("tpl", "HPLC")
            .with_section(TextSection::new("sec_1", "Intro").into())
            .with_section(table.into());

        assert_eq!(doc.section_count(), 2);
        assert_eq!(doc.sections[0].kind_name(), "text");
        assert!(!doc.sections[0].page_break_before());
        assert!(doc.sections[1].is_table());
        assert!(doc.sections[1].page_break_before());
        assert_eq!(doc.tables().count(), 1);
        assert!(doc.section("sec_2").is_some());
    }

    #[test]
    fn test_document_json() {
        let json = r#"{
            "id": "tpl", "name": "HPLC",
            "sections": [
                {"type": "text", "id": "s1", "content": "Hello", "pageBreakBefore": true},
                {"type": "table", "id": "s2", "headers": ["A"],
                 "rows": [{"id": "r1", "cells": [{"type": "text", "value": "x"}]}]},
                {"type": "checklist", "id": "s3", "items": [{"id": "i1", "label": "Clean"}]},
                {"type": "signatures", "id": "s4",
                 "signatures": [{"id": "g1", "label": "Engineer", "role": "eng"}]}
            ]
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.section_count(), 4);
        assert!(doc.sections[0].page_break_before());
        let table = doc.sections[1].as_table().unwrap();
        assert_eq!(table.rows[0], Row::new("r1", vec![Cell::text("x")]));
        assert_eq!(doc.sections[3].kind_name(), "signatures");
    }

    #[test]
    fn test_plain_text() {
        let mut doc = Document::default();
        doc.add_section(TextSection::new("a", "Hello").into());
        doc.add_section(
            TableSection::new("b")
                .with_row(Row::from_strings("r", ["x", "y"]))
                .into(),
        );
        assert_eq!(doc.plain_text(), "Hello\n\nx\ty");
    }
}
