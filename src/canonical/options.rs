//! Canonicalization options and display labels.

use serde::{Deserialize, Serialize};

/// Standard footnotes placed under descriptive test tables.
pub const DEFAULT_FOOTNOTES: &str = "¹ Los instructivos son aplicables al módulo correspondiente de cualquiera de las series 1100/1120/1200/1220/1260.\n² Recomendados por el fabricante.\n³ Las especificaciones pueden ser modificadas por el Cliente de acuerdo a sus requerimientos analíticos.";

/// Text written into synthesized rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Parameter column header
    pub parameter: String,
    /// Result column header
    pub result: String,
    /// Specification column header
    pub specification: String,
    /// Conclusions group header
    pub conclusions: String,
    /// Positive outcome
    pub complies: String,
    /// Negative outcome
    pub not_complies: String,
    /// Not-applicable outcome
    pub not_applicable: String,
    /// Label of the client specification toggle on block titles
    pub client_spec: String,
    /// Title used when a block has none
    pub default_title: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            parameter: "Parámetro".to_string(),
            result: "Resultado".to_string(),
            specification: "Especificación".to_string(),
            conclusions: "Conclusiones".to_string(),
            complies: "Cumple".to_string(),
            not_complies: "No cumple".to_string(),
            not_applicable: "No aplica".to_string(),
            client_spec: "Ver especificación\ndel cliente".to_string(),
            default_title: "Test".to_string(),
        }
    }
}

/// Options for canonicalizing tables and documents.
#[derive(Debug, Clone)]
pub struct CanonicalOptions {
    /// Labels for synthesized rows
    pub labels: Labels,

    /// Column widths assigned to outcome-block tables
    pub column_widths: Vec<String>,

    /// Text section inserted after descriptive tables (None = disabled)
    pub footnotes: Option<String>,

    /// Whether to canonicalize document tables in parallel
    pub parallel: bool,
}

impl CanonicalOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set labels.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Set the outcome-block column widths.
    pub fn with_column_widths<S: Into<String>>(
        mut self,
        widths: impl IntoIterator<Item = S>,
    ) -> Self {
        self.column_widths = widths.into_iter().map(Into::into).collect();
        self
    }

    /// Insert the given footnotes after descriptive tables.
    pub fn with_footnotes(mut self, text: impl Into<String>) -> Self {
        self.footnotes = Some(text.into());
        self
    }

    /// Insert [`DEFAULT_FOOTNOTES`] after descriptive tables.
    pub fn with_default_footnotes(self) -> Self {
        self.with_footnotes(DEFAULT_FOOTNOTES)
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for CanonicalOptions {
    fn default() -> Self {
        Self {
            labels: Labels::default(),
            column_widths: ["38%", "14%", "18%", "10%", "10%", "10%"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            footnotes: None,
            parallel: true,
        }
    }
}
