//! Shared data model for the analysis pipeline.
//!
//! Every enum here is a closed vocabulary: values the renderer, the
//! deterministic pipeline, and the model validator all agree on. Untrusted
//! model output is only admitted after it resolves into these types.

use serde::{Deserialize, Serialize};

/// Patient gender. Only used to select gender-specific rendering assets;
/// it never changes which regions are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Closed vocabulary of anatomical diagram views.
///
/// The renderer maps each view to an asset keyed by `{gender}{view}`,
/// e.g. `femalefront`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramView {
    Front,
    Back,
    #[serde(rename = "leftside")]
    LeftSide,
    #[serde(rename = "rightside")]
    RightSide,
}

impl DiagramView {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramView::Front => "front",
            DiagramView::Back => "back",
            DiagramView::LeftSide => "leftside",
            DiagramView::RightSide => "rightside",
        }
    }

    /// Parse a view identifier, tolerating case and separator noise
    /// ("Left Side", "left_side"). Anything else is outside the closed
    /// vocabulary and must be rejected by the caller.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "front" => Some(DiagramView::Front),
            "back" => Some(DiagramView::Back),
            "leftside" => Some(DiagramView::LeftSide),
            "rightside" => Some(DiagramView::RightSide),
            _ => None,
        }
    }

    /// All views, for prompt construction and validation.
    pub fn all() -> &'static [DiagramView] {
        &[
            DiagramView::Front,
            DiagramView::Back,
            DiagramView::LeftSide,
            DiagramView::RightSide,
        ]
    }

    /// Rendering asset id for a given gender, e.g. `malefront`.
    pub fn asset_id(&self, gender: Gender) -> String {
        format!("{}{}", gender.as_str(), self.as_str())
    }
}

/// Clinical relevance tier of an anatomical region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceTier {
    Critical,
    High,
    Medium,
}

/// Contextual severity tier detected near a region mention.
///
/// Ordered by weight so the scorer can keep the maximum across matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Critical,
    High,
    Moderate,
    Mild,
    Normal,
}

impl SeverityTier {
    /// Weight used when comparing tiers: higher wins.
    pub fn weight(&self) -> u8 {
        match self {
            SeverityTier::Critical => 5,
            SeverityTier::High => 4,
            SeverityTier::Moderate => 3,
            SeverityTier::Mild => 2,
            SeverityTier::Normal => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Critical => "critical",
            SeverityTier::High => "high",
            SeverityTier::Moderate => "moderate",
            SeverityTier::Mild => "mild",
            SeverityTier::Normal => "normal",
        }
    }
}

/// Severity attached to a single clinical finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Severe,
    Moderate,
    Mild,
    None,
}

impl FindingSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Severe => "severe",
            FindingSeverity::Moderate => "moderate",
            FindingSeverity::Mild => "mild",
            FindingSeverity::None => "none",
        }
    }
}

/// Left/right designation of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Laterality {
    Left,
    Right,
    Bilateral,
    Unilateral,
    None,
}

impl Laterality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Laterality::Left => "left",
            Laterality::Right => "right",
            Laterality::Bilateral => "bilateral",
            Laterality::Unilateral => "unilateral",
            Laterality::None => "none",
        }
    }
}

/// What kind of statement a sentence represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingType {
    Symptom,
    Examination,
    Investigation,
    Assessment,
}

/// Clinical significance classification of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Normal,
    Abnormal,
    Equivocal,
}

impl Significance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Significance::Normal => "normal",
            Significance::Abnormal => "abnormal",
            Significance::Equivocal => "equivocal",
        }
    }
}

/// Which path produced the final recommendation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    Rules,
    Llm,
    Hybrid,
}

/// Per-region match evidence produced by the region scorer.
///
/// Only regions with at least one term hit get an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionScore {
    pub region: String,
    pub score: u32,
    pub matched_terms: Vec<String>,
    pub severity: Option<SeverityTier>,
    pub laterality: Option<Laterality>,
    pub exam_methods: Vec<String>,
}

/// Output of the region scorer over a whole note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub scores: Vec<RegionScore>,
    pub overall_severity: SeverityTier,
    /// Top 3 regions by score, ties broken by catalog order.
    pub primary_regions: Vec<String>,
}

/// One classified observation derived from a single sentence of the
/// Physical Examination section. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalFinding {
    pub id: String,
    pub sentence: String,
    pub body_region: String,
    pub finding_type: FindingType,
    pub significance: Significance,
    pub severity: FindingSeverity,
    pub laterality: Laterality,
    pub location: String,
    pub description: String,
    /// 1 (routine) to 5 (most urgent).
    pub priority: u8,
}

/// A ranked diagram view recommendation. Lower priority = more important.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramMatch {
    pub view: DiagramView,
    pub priority: f64,
    pub findings: Vec<String>,
    pub reason: String,
}

impl DiagramMatch {
    /// Rendering asset id for this match, e.g. `femaleleftside`.
    pub fn asset_id(&self, gender: Gender) -> String {
        self.view.asset_id(gender)
    }
}

/// Structured result of extracting findings from an examination note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamReport {
    pub findings: Vec<ClinicalFinding>,
    pub body_regions: Vec<String>,
    /// Gender-specific rendering asset ids, best first.
    pub recommended_diagrams: Vec<String>,
    pub clinical_summary: String,
    pub abnormal_findings: Vec<ClinicalFinding>,
    pub normal_findings: Vec<ClinicalFinding>,
    /// Findings with priority >= 4.
    pub priority_findings: Vec<ClinicalFinding>,
}

/// Outcome of the complexity assessment that gates the model path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    pub score: f64,
    pub is_complex: bool,
    pub has_ambiguity: bool,
}

/// Final result of a hybrid analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridAnalysisResult {
    pub recommendations: Vec<DiagramMatch>,
    pub method: AnalysisMethod,
    /// Blended confidence in [0, 1].
    pub confidence: f64,
    pub reasoning: Option<String>,
    pub processing_time_ms: u64,
}

impl HybridAnalysisResult {
    /// Rendering asset ids for the recommendations, best first.
    pub fn asset_ids(&self, gender: Gender) -> Vec<String> {
        self.recommendations
            .iter()
            .map(|m| m.asset_id(gender))
            .collect()
    }
}
