//! Region scorer - scores free text against the anatomical taxonomy.
//!
//! Each synonym term present in the text adds one point to its region and
//! the ±100-character window around the first match is inspected for
//! severity, laterality, and exam-method context.

use crate::context::{classify_context, context_window, find_term};
use crate::terminology::TerminologyCatalog;
use crate::types::{RegionScore, SeverityTier, TextAnalysis};

const CONTEXT_RADIUS: usize = 100;

/// Score `text` against every region in the catalog.
///
/// Empty text yields no scores, overall severity `Mild`, and no primary
/// regions; callers must fall back to a default view in that case.
pub fn analyze(text: &str, catalog: &TerminologyCatalog) -> TextAnalysis {
    let lower = text.to_ascii_lowercase();
    let mut scores: Vec<RegionScore> = Vec::new();

    for region in &catalog.regions {
        let mut score = 0u32;
        let mut matched_terms: Vec<String> = Vec::new();
        let mut severity: Option<SeverityTier> = None;
        let mut laterality = None;
        let mut exam_methods: Vec<String> = Vec::new();

        for term in region.terms {
            let Some(pos) = find_term(&lower, term) else {
                continue;
            };
            score += 1;
            matched_terms.push(term.to_string());

            let window = context_window(&lower, pos, term.len(), CONTEXT_RADIUS);
            let signals = classify_context(window, catalog);
            if let Some(tier) = signals.severity {
                let better = severity.map_or(true, |s| tier.weight() > s.weight());
                if better {
                    severity = Some(tier);
                }
            }
            if laterality.is_none() {
                laterality = signals.laterality;
            }
            if let Some(method) = signals.exam_method {
                if !exam_methods.contains(&method) {
                    exam_methods.push(method);
                }
            }
        }

        if score > 0 {
            scores.push(RegionScore {
                region: region.id.to_string(),
                score,
                matched_terms,
                severity,
                laterality,
                exam_methods,
            });
        }
    }

    let overall_severity = scores
        .iter()
        .filter_map(|s| s.severity)
        .max_by_key(|t| t.weight())
        .unwrap_or(SeverityTier::Mild);

    let primary_regions = primary_regions(&scores);

    TextAnalysis {
        scores,
        overall_severity,
        primary_regions,
    }
}

/// Top 3 regions by score. The sort is stable, so catalog order breaks ties.
fn primary_regions(scores: &[RegionScore]) -> Vec<String> {
    let mut ranked: Vec<&RegionScore> = scores.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.iter().take(3).map(|s| s.region.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminology::catalog;
    use crate::types::Laterality;

    #[test]
    fn test_empty_text_defaults() {
        let analysis = analyze("", catalog());
        assert!(analysis.scores.is_empty());
        assert_eq!(analysis.overall_severity, SeverityTier::Mild);
        assert!(analysis.primary_regions.is_empty());
    }

    #[test]
    fn test_scores_only_matched_regions() {
        let analysis = analyze("heart sounds regular, abdomen soft", catalog());
        let regions: Vec<&str> = analysis.scores.iter().map(|s| s.region.as_str()).collect();
        assert!(regions.contains(&"heart"));
        assert!(regions.contains(&"abdomen"));
        assert!(!regions.contains(&"lungs"));
        for score in &analysis.scores {
            assert!(score.score > 0);
            assert!(!score.matched_terms.is_empty());
        }
    }

    #[test]
    fn test_context_severity_and_laterality() {
        let analysis = analyze("severe pain in the left knee", catalog());
        let lower = analysis
            .scores
            .iter()
            .find(|s| s.region == "lowerExtremities")
            .expect("knee should score lowerExtremities");
        assert_eq!(lower.severity, Some(SeverityTier::High));
        assert_eq!(lower.laterality, Some(Laterality::Left));
    }

    #[test]
    fn test_overall_severity_takes_maximum() {
        let analysis = analyze("severe chest pain and mild ankle swelling", catalog());
        assert_eq!(analysis.overall_severity, SeverityTier::High);
    }

    #[test]
    fn test_primary_regions_capped_at_three() {
        let text = "head injury, chest pain, abdominal tenderness, left knee swelling";
        let analysis = analyze(text, catalog());
        assert!(analysis.scores.len() > 3);
        assert_eq!(analysis.primary_regions.len(), 3);
    }

    #[test]
    fn test_primary_region_ties_follow_catalog_order() {
        // One term each: every score is 1, so catalog order decides.
        let analysis = analyze("neck and back and hip", catalog());
        assert_eq!(analysis.primary_regions[0], "neck");
        assert_eq!(analysis.primary_regions[1], "back");
        assert_eq!(analysis.primary_regions[2], "pelvis");
    }

    #[test]
    fn test_pure_function_idempotent() {
        let text = "Physical exam shows severe chest pain with bilateral wheezing.";
        let a = analyze(text, catalog());
        let b = analyze(text, catalog());
        assert_eq!(a, b);
    }
}
