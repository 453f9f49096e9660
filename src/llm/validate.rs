//! Validation of untrusted model output.
//!
//! The model reply is an external boundary: it is parsed into a loose
//! `serde_json::Value`, then every field is coerced against the closed
//! vocabulary and numeric bounds before anything is merged. Shape is never
//! trusted from the wire.

use crate::error::ModelError;
use crate::types::{DiagramMatch, DiagramView};
use serde_json::Value;
use tracing::debug;

/// Maximum recommendations admitted from a model reply.
const MAX_RECOMMENDATIONS: usize = 3;
/// Maximum finding strings kept per recommendation.
const MAX_FINDINGS: usize = 5;

/// A sanitized model analysis, safe to merge.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAnalysis {
    pub analysis: Option<String>,
    pub recommendations: Vec<DiagramMatch>,
    pub reasoning: Option<String>,
    pub confidence: f64,
}

/// Parse a raw model reply into a sanitized analysis.
///
/// Missing or malformed JSON is a hard `Schema` error; individually bad
/// recommendations are dropped rather than failing the whole reply.
pub fn parse_model_response(raw: &str) -> Result<ModelAnalysis, ModelError> {
    let json_str = extract_json_object(raw)
        .ok_or_else(|| ModelError::Schema("no JSON object in model reply".to_string()))?;
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| ModelError::Schema(format!("model reply is not valid JSON: {}", e)))?;
    Ok(sanitize(&value))
}

/// Coerce a loose JSON value into a `ModelAnalysis`, enforcing the
/// `DiagramMatch` invariants on every recommendation.
pub fn sanitize(value: &Value) -> ModelAnalysis {
    let confidence = value["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0);
    let analysis = value["analysis"].as_str().map(str::to_string);
    let reasoning = value["reasoning"].as_str().map(str::to_string);

    let mut recommendations = Vec::new();
    if let Some(entries) = value["recommendations"].as_array() {
        for entry in entries {
            match sanitize_recommendation(entry) {
                Some(rec) => recommendations.push(rec),
                None => debug!("dropped malformed model recommendation"),
            }
            if recommendations.len() == MAX_RECOMMENDATIONS {
                break;
            }
        }
    }

    ModelAnalysis {
        analysis,
        recommendations,
        reasoning,
        confidence,
    }
}

fn sanitize_recommendation(entry: &Value) -> Option<DiagramMatch> {
    let view = DiagramView::parse(entry["type"].as_str()?)?;
    let priority = entry["priority"].as_f64()?.clamp(1.0, 10.0);
    let findings: Vec<String> = entry["findings"]
        .as_array()?
        .iter()
        .filter_map(|f| f.as_str())
        .take(MAX_FINDINGS)
        .map(str::to_string)
        .collect();
    let reason = entry["reason"]
        .as_str()
        .unwrap_or("model recommendation")
        .to_string();

    Some(DiagramMatch {
        view,
        priority,
        findings,
        reason,
    })
}

/// Find the first balanced JSON object in a text blob, tolerating prose
/// around it and braces inside string literals.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
