//! Page-level types.

use serde::{Deserialize, Serialize};

/// One output page: indices into the document's section list.
///
/// Sections are never copied or split; a page only references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Indices of the sections placed on this page, in document order
    pub sections: Vec<usize>,

    /// Sum of the measured heights of the placed sections
    pub height: f32,

    /// Content exceeds the useful page height
    #[serde(default)]
    pub overflow: bool,
}

impl Page {
    /// Create a new empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            sections: Vec::new(),
            height: 0.0,
            overflow: false,
        }
    }

    /// Place a section on the page.
    pub fn push(&mut self, index: usize, height: f32) {
        self.sections.push(index);
        self.height += height;
    }

    /// Check if the page holds no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Get the number of sections on the page.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}
