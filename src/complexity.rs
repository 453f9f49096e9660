//! Complexity assessment - decides whether the model path is worth a call.
//!
//! A weighted score over cheap text signals. Simple notes stay on the
//! deterministic path; complex or hedged notes additionally trigger the
//! model gateway.

use crate::context::contains_term;
use crate::terminology::TerminologyCatalog;
use crate::types::{ComplexityAssessment, TextAnalysis};
use std::collections::BTreeSet;

/// Score at or above which a note counts as complex.
pub const COMPLEXITY_THRESHOLD: f64 = 3.0;

const HEDGING_WORDS: &[&str] = &[
    "possibly",
    "possible",
    "maybe",
    "uncertain",
    "unclear",
    "questionable",
];

/// Regions whose co-mention suggests an axial multi-region presentation.
const AXIAL_GROUP: &[&str] = &["head", "heart", "lungs", "chest", "abdomen"];

/// Posterior and limb regions, grouped the same way.
const POSTERIOR_LIMB_GROUP: &[&str] = &["back", "upperExtremities", "lowerExtremities"];

/// Assess how complex a note is, given the region analysis already computed
/// for it.
pub fn assess(
    text: &str,
    analysis: &TextAnalysis,
    catalog: &TerminologyCatalog,
) -> ComplexityAssessment {
    let lower = text.to_ascii_lowercase();
    let mut score = 0.0;

    // Multi-system involvement: +2 for each distinct system beyond the first.
    let systems: BTreeSet<&str> = analysis
        .scores
        .iter()
        .filter_map(|s| catalog.region(&s.region))
        .flat_map(|r| r.systems.iter().copied())
        .collect();
    if systems.len() > 1 {
        score += 2.0 * (systems.len() - 1) as f64;
    }

    // Explicit severity vocabulary (anything above the normal tier).
    let has_severity_words = catalog
        .severity_markers
        .iter()
        .filter(|(tier, _)| tier.weight() > 1)
        .any(|(_, markers)| markers.iter().any(|m| contains_term(&lower, m)));
    if has_severity_words {
        score += 1.5;
    }

    // Bilateral wording alongside an explicit side.
    if contains_term(&lower, "bilateral")
        && (contains_term(&lower, "left") || contains_term(&lower, "right"))
    {
        score += 1.5;
    }

    // Co-mentions within each anatomical group: +1 per extra region.
    score += group_comentions(analysis, AXIAL_GROUP);
    score += group_comentions(analysis, POSTERIOR_LIMB_GROUP);

    let has_ambiguity = HEDGING_WORDS.iter().any(|w| contains_term(&lower, w));
    if has_ambiguity {
        score += 1.0;
    }

    if text.chars().count() >= 200 {
        score += 1.0;
    }

    ComplexityAssessment {
        score,
        is_complex: score >= COMPLEXITY_THRESHOLD,
        has_ambiguity,
    }
}

fn group_comentions(analysis: &TextAnalysis, group: &[&str]) -> f64 {
    let mentioned = analysis
        .scores
        .iter()
        .filter(|s| group.contains(&s.region.as_str()))
        .count();
    if mentioned > 1 {
        (mentioned - 1) as f64
    } else {
        0.0
    }
}
