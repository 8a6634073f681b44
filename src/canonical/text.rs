//! Text folding for pattern matching.
//!
//! Upstream text is inconsistent in case, accents and spacing
//! ("ESPECIFICACIÓN", "Especificacion ", "especificación"). Patterns run on
//! a folded form: whitespace collapsed, lowercased, diacritics removed.

use std::ops::Range;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Folded text plus a byte map back into the source string.
#[derive(Debug, Clone)]
pub struct Folded {
    /// Folded text
    pub text: String,
    // source byte range of the char that produced each folded byte
    spans: Vec<(usize, usize)>,
}

impl Folded {
    /// Map a byte range of the folded text back to the source string.
    pub fn source_range(&self, range: Range<usize>) -> Range<usize> {
        if range.start >= self.spans.len() || range.is_empty() {
            let at = self
                .spans
                .get(range.start)
                .map(|s| s.0)
                .or_else(|| self.spans.last().map(|s| s.1))
                .unwrap_or(0);
            return at..at;
        }
        let start = self.spans[range.start].0;
        let end = self.spans[(range.end - 1).min(self.spans.len() - 1)].1;
        start..end
    }
}

/// Fold text for matching.
pub fn fold(s: &str) -> String {
    fold_with_spans(s).text
}

/// Fold text, keeping the mapping to source offsets.
pub fn fold_with_spans(s: &str) -> Folded {
    let mut text = String::with_capacity(s.len());
    let mut spans = Vec::with_capacity(s.len());
    let mut pending_space: Option<(usize, usize)> = None;

    for (i, ch) in s.char_indices() {
        let span = (i, i + ch.len_utf8());
        if ch.is_whitespace() {
            if !text.is_empty() && pending_space.is_none() {
                pending_space = Some(span);
            }
            continue;
        }
        if let Some(space) = pending_space.take() {
            text.push(' ');
            spans.push(space);
        }
        for folded in ch.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)) {
            text.push(folded);
            spans.extend(std::iter::repeat(span).take(folded.len_utf8()));
        }
    }

    Folded { text, spans }
}

/// Collapse whitespace runs into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_basic() {
        assert_eq!(fold("  ESPECIFICACIÓN  del   Cliente "), "especificacion del cliente");
        assert_eq!(fold("Parámetro"), "parametro");
        assert_eq!(fold("No\tcumple"), "no cumple");
        assert_eq!(fold(""), "");
        assert_eq!(fold("≤ 2.0 °C"), "≤ 2.0 °c");
    }

    #[test]
    fn test_source_range() {
        let src = "Ripple  Test VER ESPECIFICACIÓN";
        let folded = fold_with_spans(src);
        assert_eq!(folded.text, "ripple test ver especificacion");
        let at = folded.text.find("ver").unwrap();
        let range = folded.source_range(at..folded.text.len());
        assert_eq!(&src[range], "VER ESPECIFICACIÓN");
    }

    #[test]
    fn test_source_range_empty() {
        let folded = fold_with_spans("abc");
        assert_eq!(folded.source_range(3..3), 3..3);
        assert_eq!(folded.source_range(1..1), 1..1);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n b  "), "a b");
    }
}
