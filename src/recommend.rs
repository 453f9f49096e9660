//! Diagram recommendation generator.
//!
//! Converts region scores into at most three ranked, de-duplicated diagram
//! views. Never returns an empty list: with nothing to go on it falls back
//! to a generic front view.

use crate::terminology::TerminologyCatalog;
use crate::types::{DiagramMatch, DiagramView, Laterality, RegionScore, SeverityTier};
use std::cmp::Ordering;

/// Priority of the generic fallback recommendation.
pub const FALLBACK_PRIORITY: f64 = 10.0;

/// Rank diagram views for a set of region scores.
///
/// Lower priority is more important. The result is sorted ascending and
/// capped at three entries.
pub fn recommend(scores: &[RegionScore], catalog: &TerminologyCatalog) -> Vec<DiagramMatch> {
    let mut matches: Vec<DiagramMatch> = Vec::new();

    for score in scores {
        let Some(region) = catalog.region(&score.region) else {
            continue;
        };

        let mut priority = region.base_priority + severity_adjustment(score.severity);
        if score.score >= 5 {
            priority -= 0.5;
        } else if score.score >= 3 {
            priority -= 0.2;
        }

        let views = expand_views(region.default_views, score.laterality);
        let reason = match score.severity {
            Some(tier) => format!("{} {} findings", tier.as_str(), region.id),
            None => format!("{} findings", region.id),
        };

        for (index, view) in views.into_iter().enumerate() {
            let candidate = DiagramMatch {
                view,
                priority: priority + 0.1 * index as f64,
                findings: score.matched_terms.clone(),
                reason: reason.clone(),
            };
            upsert(&mut matches, candidate);
        }
    }

    matches.sort_by(|a, b| {
        a.priority
            .partial_cmp(&b.priority)
            .unwrap_or(Ordering::Equal)
    });
    matches.truncate(3);

    if matches.is_empty() {
        matches.push(fallback_match());
    }
    matches
}

/// The generic recommendation used when nothing scored.
pub fn fallback_match() -> DiagramMatch {
    DiagramMatch {
        view: DiagramView::Front,
        priority: FALLBACK_PRIORITY,
        findings: Vec::new(),
        reason: "General examination".to_string(),
    }
}

fn severity_adjustment(severity: Option<SeverityTier>) -> f64 {
    match severity {
        Some(SeverityTier::Critical) => -2.0,
        Some(SeverityTier::High) => -1.0,
        Some(SeverityTier::Moderate) => 0.0,
        Some(SeverityTier::Mild) => 1.0,
        Some(SeverityTier::Normal) => 2.0,
        None => 0.0,
    }
}

/// Region default views plus any laterality-driven side views.
fn expand_views(defaults: &[DiagramView], laterality: Option<Laterality>) -> Vec<DiagramView> {
    let mut views: Vec<DiagramView> = defaults.to_vec();
    let mut add = |view: DiagramView| {
        if !views.contains(&view) {
            views.push(view);
        }
    };
    match laterality {
        Some(Laterality::Left) => add(DiagramView::LeftSide),
        Some(Laterality::Right) => add(DiagramView::RightSide),
        Some(Laterality::Bilateral) => {
            add(DiagramView::LeftSide);
            add(DiagramView::RightSide);
        }
        _ => {}
    }
    views
}

/// De-duplicate by view, keeping whichever entry has the better (lower)
/// priority.
fn upsert(matches: &mut Vec<DiagramMatch>, candidate: DiagramMatch) {
    match matches.iter_mut().find(|m| m.view == candidate.view) {
        Some(existing) => {
            if candidate.priority < existing.priority {
                *existing = candidate;
            }
        }
        None => matches.push(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer;
    use crate::terminology::catalog;

    fn score(region: &str, n: u32, severity: Option<SeverityTier>) -> RegionScore {
        RegionScore {
            region: region.to_string(),
            score: n,
            matched_terms: vec![region.to_string()],
            severity,
            laterality: None,
            exam_methods: Vec::new(),
        }
    }

    #[test]
    fn test_empty_scores_fall_back_to_front() {
        let matches = recommend(&[], catalog());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].view, DiagramView::Front);
        assert_eq!(matches[0].priority, FALLBACK_PRIORITY);
    }

    #[test]
    fn test_result_capped_at_three() {
        let scores = vec![
            score("heart", 2, None),
            score("back", 1, None),
            score("skin", 1, None),
            score("neck", 1, None),
        ];
        let matches = recommend(&scores, catalog());
        assert!(matches.len() <= 3);
        assert!(!matches.is_empty());
    }

    #[test]
    fn test_sorted_ascending_by_priority() {
        let scores = vec![
            score("neck", 1, None),
            score("heart", 3, Some(SeverityTier::Critical)),
        ];
        let matches = recommend(&scores, catalog());
        for pair in matches.windows(2) {
            assert!(pair[0].priority <= pair[1].priority);
        }
        assert_eq!(matches[0].view, DiagramView::Front);
        assert_eq!(matches[0].reason, "critical heart findings");
    }

    #[test]
    fn test_severity_moves_priority() {
        let critical = recommend(&[score("neck", 1, Some(SeverityTier::Critical))], catalog());
        let normal = recommend(&[score("neck", 1, Some(SeverityTier::Normal))], catalog());
        assert!(critical[0].priority < normal[0].priority);
    }

    #[test]
    fn test_laterality_expands_views() {
        let mut left = score("lowerExtremities", 1, None);
        left.laterality = Some(Laterality::Left);
        let matches = recommend(&[left], catalog());
        let views: Vec<DiagramView> = matches.iter().map(|m| m.view).collect();
        assert!(views.contains(&DiagramView::Front));
        assert!(views.contains(&DiagramView::LeftSide));
        // Expansion index pushes the side view behind the default.
        let front = matches.iter().find(|m| m.view == DiagramView::Front).unwrap();
        let side = matches
            .iter()
            .find(|m| m.view == DiagramView::LeftSide)
            .unwrap();
        assert!(front.priority < side.priority);
    }

    #[test]
    fn test_bilateral_adds_both_sides() {
        let mut bilateral = score("lungs", 1, None);
        bilateral.laterality = Some(Laterality::Bilateral);
        let matches = recommend(&[bilateral], catalog());
        let views: Vec<DiagramView> = matches.iter().map(|m| m.view).collect();
        assert!(views.contains(&DiagramView::LeftSide) || views.contains(&DiagramView::RightSide));
    }

    #[test]
    fn test_duplicate_views_keep_best_priority() {
        // heart and chest both default to the front view.
        let scores = vec![
            score("heart", 1, Some(SeverityTier::Critical)),
            score("chest", 1, None),
        ];
        let matches = recommend(&scores, catalog());
        let fronts: Vec<&DiagramMatch> = matches
            .iter()
            .filter(|m| m.view == DiagramView::Front)
            .collect();
        assert_eq!(fronts.len(), 1);
        assert_eq!(fronts[0].priority, 0.0); // 2.0 base - 2.0 critical
    }

    #[test]
    fn test_severe_chest_outranks_mild_ankle() {
        let analysis = scorer::analyze(
            "severe chest pain noted. mild ankle swelling on the right.",
            catalog(),
        );
        let matches = recommend(&analysis.scores, catalog());
        let chest_rank = matches
            .iter()
            .position(|m| m.reason.contains("chest") || m.reason.contains("heart"));
        let ankle_rank = matches
            .iter()
            .position(|m| m.reason.contains("lowerExtremities"));
        if let (Some(c), Some(a)) = (chest_rank, ankle_rank) {
            assert!(c < a);
        } else {
            assert_eq!(chest_rank.is_some(), true);
        }
    }
}
