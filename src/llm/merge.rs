//! Merge policy between rule-based and model recommendations.
//!
//! Confidence decides everything: low-confidence model output is discarded,
//! high-confidence output wins outright, and the middle band produces a
//! hybrid union with a slight deterministic tie-break in favor of rules.

use super::validate::ModelAnalysis;
use crate::types::{AnalysisMethod, DiagramMatch};
use std::cmp::Ordering;
use tracing::debug;

/// Below this the model output is discarded entirely.
pub const DISCARD_BELOW: f64 = 0.6;
/// At or above this the model output is returned verbatim.
pub const TRUST_AT: f64 = 0.8;
/// Priority nudge applied to rule entries in the hybrid band, so that
/// rules win exact-priority ties deterministically.
const RULE_NUDGE: f64 = 0.1;

/// Merged recommendations plus the metadata the analyzer reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub recommendations: Vec<DiagramMatch>,
    pub method: AnalysisMethod,
    pub confidence: f64,
    pub reasoning: Option<String>,
}

/// Rule-path confidence as a function of how many recommendations it made.
/// Non-decreasing in the count.
pub fn rule_confidence(count: usize) -> f64 {
    match count {
        0 => 0.5,
        1 => 0.7,
        2 => 0.8,
        _ => 0.85,
    }
}

/// Apply the confidence-gated merge policy.
pub fn merge(rules: Vec<DiagramMatch>, model: ModelAnalysis) -> Merged {
    if model.confidence < DISCARD_BELOW || model.recommendations.is_empty() {
        debug!(
            confidence = model.confidence,
            "model output discarded, keeping rule result"
        );
        let confidence = rule_confidence(rules.len());
        return Merged {
            recommendations: rules,
            method: AnalysisMethod::Rules,
            confidence,
            reasoning: None,
        };
    }

    if model.confidence >= TRUST_AT {
        return Merged {
            recommendations: model.recommendations,
            method: AnalysisMethod::Llm,
            confidence: model.confidence,
            reasoning: model.reasoning,
        };
    }

    // Middle band: union by view, better (lower) priority wins, rules
    // nudged so shared views resolve deterministically.
    let rules_confidence = rule_confidence(rules.len());
    let mut merged: Vec<DiagramMatch> = Vec::new();
    for mut rule in rules {
        rule.priority += RULE_NUDGE;
        upsert(&mut merged, rule);
    }
    for rec in model.recommendations {
        upsert(&mut merged, rec);
    }
    merged.sort_by(|a, b| {
        a.priority
            .partial_cmp(&b.priority)
            .unwrap_or(Ordering::Equal)
    });
    merged.truncate(3);

    Merged {
        recommendations: merged,
        method: AnalysisMethod::Hybrid,
        confidence: (rules_confidence + model.confidence) / 2.0,
        reasoning: model.reasoning,
    }
}

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
