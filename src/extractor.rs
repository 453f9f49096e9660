//! Clinical finding extractor.
//!
//! Isolates the Physical Examination section of a note, splits it into
//! sentences, and classifies each sentence into a structured finding.
//! History, assessment, and plan text never produce findings.

use crate::context::{contains_term, detect_laterality};
use crate::recommend;
use crate::scorer;
use crate::terminology::TerminologyCatalog;
use crate::types::{
    ClinicalFinding, ExamReport, FindingSeverity, FindingType, Gender, Laterality, RelevanceTier,
    Significance,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Header synonyms that open the Physical Examination section.
const EXAM_HEADERS: &[&str] = &[
    "physical examination",
    "physical exam",
    "clinical examination",
    "clinical exam",
    "objective findings",
    "on examination",
    "examination findings",
];

/// Headers that terminate the section. Disjoint from `EXAM_HEADERS`.
const SECTION_TERMINATORS: &[&str] = &[
    "assessment",
    "diagnosis",
    "diagnoses",
    "plan",
    "treatment",
    "impression",
    "recommendation",
    "recommendations",
    "summary",
];

/// Keywords that mark text as examination content when no header exists.
const EXAM_INDICATORS: &[&str] = &[
    "auscultation",
    "palpation",
    "percussion",
    "blood pressure",
    "heart rate",
    "respiratory rate",
    "bowel sounds",
    "breath sounds",
    "heart sounds",
    "oxygen saturation",
    "reflexes",
    "tenderness",
    "no acute distress",
];

/// Trailing tokens that do not end a sentence despite the period.
const ABBREVIATIONS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "st", "vs", "etc", "e.g", "i.e", "e", "i", "approx",
];

const EXAM_PHRASES: &[&str] = &[
    "auscultation",
    "palpation",
    "percussion",
    "inspection",
    "examination",
    "on exam",
    "noted",
    "observed",
    "palpable",
    "appears",
    "reveals",
];

const SYMPTOM_PHRASES: &[&str] = &[
    "complains",
    "reports",
    "pain",
    "ache",
    "aching",
    "discomfort",
    "nausea",
    "dizziness",
    "states",
    "feels",
];

/// Descriptors whose presence forces an abnormal classification.
const ABNORMAL_DESCRIPTORS: &[&str] = &[
    "tender",
    "tenderness",
    "swollen",
    "swelling",
    "enlarged",
    "diminished",
    "distended",
    "rigid",
    "guarding",
    "wheeze",
    "wheezing",
    "crackles",
    "rales",
    "murmur",
    "edema",
    "erythema",
    "deformity",
    "laceration",
    "bruising",
    "absent",
    "irregular",
];

const NORMAL_INDICATORS: &[&str] = &[
    "normal",
    "clear",
    "regular",
    "soft",
    "intact",
    "symmetric",
    "equal",
    "stable",
    "unremarkable",
];

/// Abnormal terms used only for the normal-vs-abnormal tally.
const ABNORMAL_INDICATORS: &[&str] = &["pain", "abnormal", "asymmetric", "decreased", "elevated"];

static NEGATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(no|not|without|denies|non)[\s-]+[a-z]").expect("negation regex"));

const FORCED_NORMAL: &[&str] = &["unremarkable", "within normal limits"];

/// Extract structured findings from a free-text examination note.
///
/// Returns a defined empty report when no Physical Examination section can
/// be located; it never invents findings from history or plan text.
pub fn extract(note: &str, gender: Gender, catalog: &TerminologyCatalog) -> ExamReport {
    let lower = note.to_ascii_lowercase();
    let Some(section) = isolate_section(&lower, note) else {
        debug!("no examination section located, returning empty report");
        return empty_report(gender);
    };

    let mut findings: Vec<ClinicalFinding> = Vec::new();
    for (index, sentence) in split_sentences(&section).into_iter().enumerate() {
        if let Some(finding) = classify_sentence(&sentence, index, catalog) {
            findings.push(finding);
        }
    }

    // Abnormal findings first, then by descending priority. Stable, so
    // sentence order breaks remaining ties.
    findings.sort_by(|a, b| {
        let a_key = (a.significance != Significance::Abnormal) as u8;
        let b_key = (b.significance != Significance::Abnormal) as u8;
        a_key.cmp(&b_key).then(b.priority.cmp(&a.priority))
    });

    let mut body_regions: Vec<String> = Vec::new();
    for finding in &findings {
        if !body_regions.contains(&finding.body_region) {
            body_regions.push(finding.body_region.clone());
        }
    }

    let analysis = scorer::analyze(&section, catalog);
    let recommended_diagrams = recommend::recommend(&analysis.scores, catalog)
        .iter()
        .map(|m| m.asset_id(gender))
        .collect();

    let abnormal_findings: Vec<ClinicalFinding> = findings
        .iter()
        .filter(|f| f.significance == Significance::Abnormal)
        .cloned()
        .collect();
    let normal_findings: Vec<ClinicalFinding> = findings
        .iter()
        .filter(|f| f.significance == Significance::Normal)
        .cloned()
        .collect();
    let priority_findings: Vec<ClinicalFinding> = findings
        .iter()
        .filter(|f| f.priority >= 4)
        .cloned()
        .collect();

    let clinical_summary = summarize(&findings, abnormal_findings.len(), normal_findings.len());

    ExamReport {
        findings,
        body_regions,
        recommended_diagrams,
        clinical_summary,
        abnormal_findings,
        normal_findings,
        priority_findings,
    }
}

/// Locate the Physical Examination section in `original`.
///
/// `lower` must be the ASCII-lowercased copy of `original` so byte offsets
/// line up. Falls back to the whole text when at least one examination
/// indicator keyword is present; otherwise there is no section.
fn isolate_section(lower: &str, original: &str) -> Option<String> {
    if let Some((pos, len)) = find_earliest(lower, EXAM_HEADERS) {
        let mut start = pos + len;
        while let Some(c) = original[start..].chars().next() {
            if c == ':' || c == '-' || c.is_whitespace() {
                start += c.len_utf8();
            } else {
                break;
            }
        }
        let end = find_earliest(&lower[start..], SECTION_TERMINATORS)
            .map(|(p, _)| start + p)
            .unwrap_or(original.len());
        let section = original[start..end].trim();
        if section.is_empty() {
            return None;
        }
        return Some(section.to_string());
    }

    if EXAM_INDICATORS.iter().any(|k| contains_term(lower, k)) {
        debug!("no examination header, whole note treated as section");
        return Some(original.trim().to_string());
    }
    None
}

/// Earliest word-boundary match among `needles`; ties prefer the longest
/// needle so "physical examination" wins over "physical exam".
fn find_earliest(haystack: &str, needles: &[&str]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for needle in needles {
        if let Some(pos) = crate::context::find_term(haystack, needle) {
            let replace = match best {
                Some((bp, bl)) => pos < bp || (pos == bp && needle.len() > bl),
                None => true,
            };
            if replace {
                best = Some((pos, needle.len()));
            }
        }
    }
    best
}

/// Split text into sentences on terminal punctuation, guarding against
/// common abbreviations. Sentences shorter than 10 characters are dropped.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if c == '.' && ends_with_abbreviation(&text[start..i]) {
            continue;
        }
        push_sentence(&mut sentences, &text[start..i]);
        start = i + c.len_utf8();
    }
    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn ends_with_abbreviation(candidate: &str) -> bool {
    let token = candidate
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    ABBREVIATIONS.contains(&token.as_str())
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.chars().count() >= 10 {
        sentences.push(trimmed.to_string());
    }
}

/// Classify one sentence into a finding, or drop it when no body region
/// resolves.
fn classify_sentence(
    sentence: &str,
    index: usize,
    catalog: &TerminologyCatalog,
) -> Option<ClinicalFinding> {
    let lower = sentence.to_ascii_lowercase();
    let (body_region, location) = resolve_region(&lower, catalog)?;
    let region = catalog.region(&body_region)?;

    let finding_type = if EXAM_PHRASES.iter().any(|p| contains_term(&lower, p)) {
        FindingType::Examination
    } else if SYMPTOM_PHRASES.iter().any(|p| contains_term(&lower, p)) {
        FindingType::Symptom
    } else {
        FindingType::Examination
    };

    let significance = classify_significance(&lower);
    let severity = finding_severity(&lower);
    let laterality = detect_laterality(&lower, catalog).unwrap_or(Laterality::None);

    let mut priority: u8 = 1;
    priority += match significance {
        Significance::Abnormal => 2,
        Significance::Equivocal => 1,
        Significance::Normal => 0,
    };
    priority += match severity {
        FindingSeverity::Severe => 2,
        FindingSeverity::Moderate => 1,
        _ => 0,
    };
    priority += match region.relevance {
        RelevanceTier::Critical => 2,
        RelevanceTier::High => 1,
        RelevanceTier::Medium => 0,
    };
    priority = priority.min(5);

    let description = format!(
        "{} finding in {}: {}",
        significance.as_str(),
        body_region,
        sentence
    );

    Some(ClinicalFinding {
        id: format!("finding-{}", index + 1),
        sentence: sentence.to_string(),
        body_region,
        finding_type,
        significance,
        severity,
        laterality,
        location,
        description,
        priority,
    })
}

/// First region whose synonyms match, falling back to the abbreviation
/// table. Returns the region id and the term that matched.
fn resolve_region(lower: &str, catalog: &TerminologyCatalog) -> Option<(String, String)> {
    for region in &catalog.regions {
        for term in region.terms {
            if contains_term(lower, term) {
                return Some((region.id.to_string(), term.to_string()));
            }
        }
    }
    for (abbreviation, region_id) in catalog.abbreviations {
        if contains_term(lower, abbreviation) {
            return Some((region_id.to_string(), abbreviation.to_string()));
        }
    }
    None
}

/// Negation-aware significance classification. Negation patterns beat
/// keyword counting; explicit abnormal descriptors beat the tally.
fn classify_significance(lower: &str) -> Significance {
    if NEGATION.is_match(lower) || FORCED_NORMAL.iter().any(|p| lower.contains(p)) {
        return Significance::Normal;
    }
    if ABNORMAL_DESCRIPTORS.iter().any(|d| contains_term(lower, d)) {
        return Significance::Abnormal;
    }

    let normal = NORMAL_INDICATORS
        .iter()
        .filter(|t| contains_term(lower, t))
        .count();
    let abnormal = ABNORMAL_INDICATORS
        .iter()
        .filter(|t| contains_term(lower, t))
        .count();
    if normal > abnormal {
        Significance::Normal
    } else if abnormal > normal {
        Significance::Abnormal
    } else {
        Significance::Equivocal
    }
}

/// First matching severity keyword, else none.
fn finding_severity(lower: &str) -> FindingSeverity {
    const SEVERE: &[&str] = &["severe", "acute", "marked", "intense"];
    const MODERATE: &[&str] = &["moderate"];
    const MILD: &[&str] = &["mild", "slight", "minor"];
    if SEVERE.iter().any(|t| contains_term(lower, t)) {
        FindingSeverity::Severe
    } else if MODERATE.iter().any(|t| contains_term(lower, t)) {
        FindingSeverity::Moderate
    } else if MILD.iter().any(|t| contains_term(lower, t)) {
        FindingSeverity::Mild
    } else {
        FindingSeverity::None
    }
}

fn summarize(findings: &[ClinicalFinding], abnormal: usize, normal: usize) -> String {
    let mut summary = format!(
        "Physical examination documented {} abnormal and {} normal finding(s).",
        abnormal, normal
    );
    let top = findings
        .iter()
        .max_by_key(|f| f.priority)
        .filter(|f| f.priority >= 4);
    if let Some(finding) = top {
        summary.push_str(&format!(" Most significant: {}.", finding.description));
    }
    summary
}

fn empty_report(gender: Gender) -> ExamReport {
    ExamReport {
        findings: Vec::new(),
        body_regions: Vec::new(),
        recommended_diagrams: vec![format!("{}front", gender.as_str())],
        clinical_summary: "No Physical Examination section found.".to_string(),
        abnormal_findings: Vec::new(),
        normal_findings: Vec::new(),
        priority_findings: Vec::new(),
    }
}
