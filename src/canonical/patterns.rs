//! Content patterns used to recognize row shapes.
//!
//! Every content heuristic is a named regular expression. Patterns match
//! against folded text (see [`super::text::fold`]), so they are written in
//! lowercase without accents.

use super::text::{collapse_whitespace, fold, fold_with_spans};
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names of the configurable patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// "Parameter" column label
    Parameter,
    /// "Result" column label
    Result,
    /// "Specification" column label
    Specification,
    /// "Conclusions" column label
    Conclusions,
    /// Positive outcome marker
    Complies,
    /// Negative outcome marker
    NotComplies,
    /// Not-applicable outcome marker
    NotApplicable,
    /// "See client specification" marker on block titles
    ClientSpec,
    /// Instruction code opening an anchor row (e.g. `QI7.0513`)
    InstructionCode,
    /// "Applicable instruction" header
    InstructionHeader,
    /// "Test" header
    TestHeader,
    /// "New specification" header
    NewSpecification,
    /// Parameter-like label in a misaligned continuation row
    ParameterLabel,
    /// Specification-like value (operators, units, decimals)
    SpecificationValue,
    /// Sentence announcing a detector selection
    DetectorPhrase,
}

impl Pattern {
    /// All patterns in configuration order.
    pub const ALL: [Pattern; 15] = [
        Pattern::Parameter,
        Pattern::Result,
        Pattern::Specification,
        Pattern::Conclusions,
        Pattern::Complies,
        Pattern::NotComplies,
        Pattern::NotApplicable,
        Pattern::ClientSpec,
        Pattern::InstructionCode,
        Pattern::InstructionHeader,
        Pattern::TestHeader,
        Pattern::NewSpecification,
        Pattern::ParameterLabel,
        Pattern::SpecificationValue,
        Pattern::DetectorPhrase,
    ];

    /// Configuration key of the pattern.
    pub fn name(self) -> &'static str {
        match self {
            Pattern::Parameter => "parameter",
            Pattern::Result => "result",
            Pattern::Specification => "specification",
            Pattern::Conclusions => "conclusions",
            Pattern::Complies => "complies",
            Pattern::NotComplies => "not_complies",
            Pattern::NotApplicable => "not_applicable",
            Pattern::ClientSpec => "client_spec",
            Pattern::InstructionCode => "instruction_code",
            Pattern::InstructionHeader => "instruction_header",
            Pattern::TestHeader => "test_header",
            Pattern::NewSpecification => "new_specification",
            Pattern::ParameterLabel => "parameter_label",
            Pattern::SpecificationValue => "specification_value",
            Pattern::DetectorPhrase => "detector_phrase",
        }
    }
}

/// Pattern sources, as loaded from a configuration file.
///
/// Missing fields fall back to the built-in Spanish/English defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub parameter: String,
    pub result: String,
    pub specification: String,
    pub conclusions: String,
    pub complies: String,
    pub not_complies: String,
    pub not_applicable: String,
    pub client_spec: String,
    pub instruction_code: String,
    pub instruction_header: String,
    pub test_header: String,
    pub new_specification: String,
    pub parameter_label: String,
    pub specification_value: String,
    pub detector_phrase: String,
    /// Detector names offered in the selector row, in display order
    pub detectors: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            parameter: r"\bparametros?\b|\bparameters?\b".to_string(),
            result: r"\bresultados?\b|\bresults?\b".to_string(),
            specification: r"\bespecificacion(es)?\b|\bspecifications?\b".to_string(),
            conclusions: r"\bconclusion(es)?\b|\bconclusions?\b".to_string(),
            complies: r"^(cumple|complies|pass)$".to_string(),
            not_complies: r"\bno\s+cumple\b|\bdoes\s+not\s+comply\b|^fail$".to_string(),
            not_applicable: r"\bno\s+aplica\b|\bnot\s+applicable\b|^n/?a$".to_string(),
            client_spec: r"ver\s+especificacion(\s+del\s+cliente)?|see\s+client\s+specification"
                .to_string(),
            instruction_code: r"^qi\d+\.\d+".to_string(),
            instruction_header: r"instructivo\s+aplicable|applicable\s+instruction".to_string(),
            test_header: r"^test$".to_string(),
            new_specification: r"nueva\s+especificacion|new\s+specification".to_string(),
            parameter_label: concat!(
                r"estabilidad|temperatura|izquierdo|derecho|ruido|wander|deriva|",
                r"stability|temperature|left|right|noise|drift"
            )
            .to_string(),
            specification_value: r"[≤≥<>]|°c|nriu|%\s*$|\d+\.\d+|^\d".to_string(),
            detector_phrase: r"detector con el que se realiza el test".to_string(),
            detectors: ["VWD", "MWD", "DAD", "RID"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl PatternConfig {
    /// Load a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Source text of one pattern.
    pub fn source(&self, pattern: Pattern) -> &str {
        match pattern {
            Pattern::Parameter => &self.parameter,
            Pattern::Result => &self.result,
            Pattern::Specification => &self.specification,
            Pattern::Conclusions => &self.conclusions,
            Pattern::Complies => &self.complies,
            Pattern::NotComplies => &self.not_complies,
            Pattern::NotApplicable => &self.not_applicable,
            Pattern::ClientSpec => &self.client_spec,
            Pattern::InstructionCode => &self.instruction_code,
            Pattern::InstructionHeader => &self.instruction_header,
            Pattern::TestHeader => &self.test_header,
            Pattern::NewSpecification => &self.new_specification,
            Pattern::ParameterLabel => &self.parameter_label,
            Pattern::SpecificationValue => &self.specification_value,
            Pattern::DetectorPhrase => &self.detector_phrase,
        }
    }

    /// Compile into a [`PatternSet`].
    pub fn compile(&self) -> Result<PatternSet> {
        PatternSet::new(self)
    }
}

/// Compiled patterns.
#[derive(Debug, Clone)]
pub struct PatternSet {
    regexes: Vec<Regex>,
    detectors: Vec<String>,
    detector_keys: Vec<String>,
    detector_suffix: Option<Regex>,
}

impl PatternSet {
    /// Compile a configuration.
    pub fn new(config: &PatternConfig) -> Result<Self> {
        let regexes = Pattern::ALL
            .iter()
            .map(|&p| compile(p.name(), config.source(p)))
            .collect::<Result<Vec<_>>>()?;

        let detectors: Vec<String> = config
            .detectors
            .iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        let detector_keys: Vec<String> = detectors.iter().map(|d| fold(d)).collect();

        // trailing "VWD/MWD/DAD/RID" style list on a title
        let detector_suffix = if detector_keys.is_empty() {
            None
        } else {
            let body = detector_keys
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join(r"\s*/?\s*");
            Some(compile("detectors", &format!(r"\s*{}\s*$", body))?)
        };

        Ok(Self {
            regexes,
            detectors,
            detector_keys,
            detector_suffix,
        })
    }

    /// Test folded text against a pattern.
    pub fn is_match(&self, pattern: Pattern, folded: &str) -> bool {
        self.regex(pattern).is_match(folded)
    }

    /// Fold raw text and test it against a pattern.
    pub fn matches_raw(&self, pattern: Pattern, raw: &str) -> bool {
        self.is_match(pattern, &fold(raw))
    }

    /// Detector display names.
    pub fn detectors(&self) -> &[String] {
        &self.detectors
    }

    /// Folded detector names, for option keys and lookups.
    pub fn detector_keys(&self) -> &[String] {
        &self.detector_keys
    }

    /// Remove every match of `pattern` from raw text, collapsing whitespace.
    pub fn strip(&self, pattern: Pattern, raw: &str) -> String {
        strip_matches(self.regex(pattern), raw)
    }

    /// Remove a trailing detector list from raw text.
    pub fn strip_detector_suffix(&self, raw: &str) -> String {
        match &self.detector_suffix {
            Some(re) => strip_matches(re, raw),
            None => collapse_whitespace(raw),
        }
    }

    fn regex(&self, pattern: Pattern) -> &Regex {
        // ALL lists every variant once, in declaration order
        &self.regexes[pattern as usize]
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        PatternSet::new(&PatternConfig::default()).expect("built-in patterns are valid")
    }
}

fn compile(name: &str, source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|source| Error::InvalidPattern {
        name: name.to_string(),
        source,
    })
}

fn strip_matches(re: &Regex, raw: &str) -> String {
    let folded = fold_with_spans(raw);
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for m in re.find_iter(&folded.text) {
        let range = folded.source_range(m.range());
        if range.start < last {
            continue;
        }
        out.push_str(&raw[last..range.start]);
        out.push(' ');
        last = range.end;
    }
    out.push_str(&raw[last..]);
    collapse_whitespace(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_compile() {
        let set = PatternConfig::default().compile().unwrap();
        assert_eq!(set.detectors(), &["VWD", "MWD", "DAD", "RID"]);
        assert_eq!(set.detector_keys(), &["vwd", "mwd", "dad", "rid"]);
    }

    #[test]
    fn test_pattern_order_matches_enum() {
        for (i, p) in Pattern::ALL.iter().enumerate() {
            assert_eq!(*p as usize, i, "{}", p.name());
        }
    }

    #[test]
    fn test_header_keywords() {
        let set = PatternSet::default();
        assert!(set.matches_raw(Pattern::Parameter, "Parámetro"));
        assert!(set.matches_raw(Pattern::Result, "RESULTADO"));
        assert!(set.matches_raw(Pattern::Specification, "Especificación"));
        assert!(set.matches_raw(Pattern::Conclusions, "Conclusiones"));
        assert!(!set.matches_raw(Pattern::Parameter, "Parametrización"));
    }

    #[test]
    fn test_outcome_markers() {
        let set = PatternSet::default();
        assert!(set.matches_raw(Pattern::Complies, "Cumple"));
        assert!(!set.matches_raw(Pattern::Complies, "No cumple"));
        assert!(set.matches_raw(Pattern::NotComplies, "No  cumple"));
        assert!(set.matches_raw(Pattern::NotApplicable, "No aplica"));
        assert!(set.matches_raw(Pattern::NotApplicable, "N/A"));
    }

    #[test]
    fn test_continuation_patterns() {
        let set = PatternSet::default();
        assert!(set.matches_raw(Pattern::InstructionCode, "QI7.0513"));
        assert!(!set.matches_raw(Pattern::InstructionCode, "Ver QI7.0513"));
        assert!(set.matches_raw(Pattern::ParameterLabel, "Deriva"));
        assert!(set.matches_raw(Pattern::SpecificationValue, "≤ 5.0 x 10-5 AU"));
        assert!(set.matches_raw(Pattern::SpecificationValue, "± 2 °C"));
        assert!(!set.matches_raw(Pattern::SpecificationValue, "Lampara"));
    }

    #[test]
    fn test_strip_client_spec() {
        let set = PatternSet::default();
        assert_eq!(
            set.strip(Pattern::ClientSpec, "Ripple Test  VER ESPECIFICACIÓN DEL CLIENTE"),
            "Ripple Test"
        );
        assert_eq!(set.strip(Pattern::ClientSpec, "Ripple Test"), "Ripple Test");
    }

    #[test]
    fn test_strip_detector_suffix() {
        let set = PatternSet::default();
        assert_eq!(
            set.strip_detector_suffix("Test de ruido VWD / MWD/DAD/ RID"),
            "Test de ruido"
        );
        assert_eq!(set.strip_detector_suffix("Test VWD de ruido"), "Test VWD de ruido");
    }

    #[test]
    fn test_config_partial_json() {
        let config = PatternConfig::from_json(r#"{"detectors": ["UV"]}"#).unwrap();
        assert_eq!(config.detectors, vec!["UV"]);
        assert_eq!(config.parameter, PatternConfig::default().parameter);
    }

    #[test]
    fn test_invalid_pattern() {
        let config = PatternConfig {
            complies: "(".to_string(),
            ..Default::default()
        };
        match config.compile() {
            Err(Error::InvalidPattern { name, .. }) => assert_eq!(name, "complies"),
            other => panic!("expected InvalidPattern, got {:?}", other),
        }
    }
}
