//! Shared text-context classification.
//!
//! Both the region scorer and the finding extractor need the same severity,
//! laterality, and exam-method heuristics. They live here in one place so
//! the two call sites cannot drift apart.

use crate::terminology::TerminologyCatalog;
use crate::types::{Laterality, SeverityTier};

/// Signals detected in a piece of text (usually a window around a region
/// term, or a single sentence).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextSignals {
    pub severity: Option<SeverityTier>,
    pub laterality: Option<Laterality>,
    pub exam_method: Option<String>,
}

/// Find a term in text, requiring word boundaries on both sides so that
/// "arm" does not match inside "warm" or "pharmacy". Multi-word terms are
/// matched the same way. Expects already-lowercased input.
pub fn find_term(text: &str, term: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(term) {
        let start = from + rel;
        let end = start + term.len();
        let before_ok = start == 0
            || !text[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric());
        let after_ok = end == text.len()
            || !text[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric());
        if before_ok && after_ok {
            return Some(start);
        }
        from = start + 1;
    }
    None
}

pub fn contains_term(text: &str, term: &str) -> bool {
    find_term(text, term).is_some()
}

/// Slice a window of roughly `radius` bytes either side of a match,
/// clamped to the text and snapped to char boundaries.
pub fn context_window(text: &str, match_start: usize, match_len: usize, radius: usize) -> &str {
    let mut start = match_start.saturating_sub(radius);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (match_start + match_len + radius).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    &text[start..end]
}

/// Classify severity, laterality, and exam method for a piece of text.
///
/// Severity keeps the maximum-weight tier present; laterality resolves to
/// bilateral when both sides are mentioned; exam method is the first marker
/// found. Expects already-lowercased input.
pub fn classify_context(text: &str, catalog: &TerminologyCatalog) -> ContextSignals {
    let mut severity: Option<SeverityTier> = None;
    for (tier, markers) in catalog.severity_markers {
        if markers.iter().any(|m| contains_term(text, m)) {
            let better = severity.map_or(true, |s| tier.weight() > s.weight());
            if better {
                severity = Some(*tier);
            }
        }
    }

    let laterality = detect_laterality(text, catalog);

    let exam_method = catalog
        .exam_method_markers
        .iter()
        .find(|m| contains_term(text, m))
        .map(|m| m.to_string());

    ContextSignals {
        severity,
        laterality,
        exam_method,
    }
}

/// Laterality with the bilateral-from-both-sides rule applied.
pub fn detect_laterality(text: &str, catalog: &TerminologyCatalog) -> Option<Laterality> {
    let left = contains_term(text, "left");
    let right = contains_term(text, "right");
    if left && right {
        return Some(Laterality::Bilateral);
    }
    for (laterality, markers) in catalog.laterality_markers {
        if markers.iter().any(|m| contains_term(text, m)) {
            return Some(*laterality);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminology::catalog;

    #[test]
    fn test_find_term_word_boundaries() {
        assert_eq!(find_term("the left arm is warm", "arm"), Some(9));
        assert_eq!(find_term("the room is warm", "arm"), None);
        assert_eq!(find_term("pharmacy records", "arm"), None);
        assert_eq!(find_term("arm", "arm"), Some(0));
    }

    #[test]
    fn test_find_term_multiword() {
        assert!(contains_term("breath sounds are clear", "breath sounds"));
        assert!(!contains_term("breathing sounds fine", "breath sounds"));
    }

    #[test]
    fn test_severity_keeps_maximum_weight() {
        let signals = classify_context("mild pain but severe swelling", catalog());
        assert_eq!(signals.severity, Some(SeverityTier::High));
    }

    #[test]
    fn test_bilateral_from_both_sides() {
        let cat = catalog();
        assert_eq!(
            detect_laterality("left knee and right knee", cat),
            Some(Laterality::Bilateral)
        );
        assert_eq!(detect_laterality("left knee", cat), Some(Laterality::Left));
        assert_eq!(
            detect_laterality("bilateral crackles", cat),
            Some(Laterality::Bilateral)
        );
        assert_eq!(detect_laterality("knee swelling", cat), None);
    }

    #[test]
    fn test_exam_method_first_found() {
        let signals = classify_context("tender on palpation, dull to percussion", catalog());
        assert_eq!(signals.exam_method.as_deref(), Some("palpation"));
    }

    #[test]
    fn test_window_clamps_to_text() {
        let text = "short";
        assert_eq!(context_window(text, 0, 5, 100), "short");
        let long = "a".repeat(300);
        let w = context_window(&long, 150, 3, 100);
        assert_eq!(w.len(), 203);
    }
}
