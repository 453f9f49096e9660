//! Terminology catalog - the static anatomical taxonomy.
//!
//! Regions, synonym terms, clinical-relevance tiers, and the marker
//! vocabularies for severity, laterality, and examination methods. Built
//! once behind a `Lazy` and shared by reference; nothing here is ever
//! mutated at runtime.
//!
//! Catalog order is significant: it breaks score ties in the region scorer
//! and decides which region claims a sentence in the extractor, so the
//! critical-tier regions come first.

use crate::types::{DiagramView, Laterality, RelevanceTier, SeverityTier};
use once_cell::sync::Lazy;

/// One anatomical region with its synonym terms and rendering defaults.
#[derive(Debug, Clone)]
pub struct AnatomicalRegion {
    pub id: &'static str,
    pub terms: &'static [&'static str],
    pub systems: &'static [&'static str],
    pub relevance: RelevanceTier,
    /// Starting priority for diagram recommendation, before severity and
    /// score adjustments. Lower is more important.
    pub base_priority: f64,
    pub default_views: &'static [DiagramView],
}

/// The full read-only taxonomy.
#[derive(Debug)]
pub struct TerminologyCatalog {
    pub regions: Vec<AnatomicalRegion>,
    /// Severity markers grouped by tier, checked highest weight first.
    pub severity_markers: &'static [(SeverityTier, &'static [&'static str])],
    pub laterality_markers: &'static [(Laterality, &'static [&'static str])],
    pub exam_method_markers: &'static [&'static str],
    /// Shorthand and abbreviations that resolve to a region id when no
    /// full synonym matches ("resp" -> lungs, "abd" -> abdomen).
    pub abbreviations: &'static [(&'static str, &'static str)],
}

impl TerminologyCatalog {
    pub fn region(&self, id: &str) -> Option<&AnatomicalRegion> {
        self.regions.iter().find(|r| r.id == id)
    }
}

const SEVERITY_MARKERS: &[(SeverityTier, &[&str])] = &[
    (
        SeverityTier::Critical,
        &[
            "critical",
            "life-threatening",
            "life threatening",
            "emergency",
            "unresponsive",
        ],
    ),
    (
        SeverityTier::High,
        &["severe", "acute", "significant", "marked", "intense"],
    ),
    (SeverityTier::Moderate, &["moderate", "considerable"]),
    (SeverityTier::Mild, &["mild", "slight", "minor", "minimal"]),
    (
        SeverityTier::Normal,
        &["normal", "unremarkable", "within normal limits"],
    ),
];

const LATERALITY_MARKERS: &[(Laterality, &[&str])] = &[
    (Laterality::Bilateral, &["bilateral", "bilaterally", "both"]),
    (Laterality::Left, &["left", "left-sided"]),
    (Laterality::Right, &["right", "right-sided"]),
    (Laterality::Unilateral, &["unilateral", "one-sided"]),
];

const EXAM_METHOD_MARKERS: &[&str] = &[
    "palpation",
    "auscultation",
    "percussion",
    "inspection",
    "range of motion",
];

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("cardiac", "heart"),
    ("cardio", "heart"),
    ("cv", "heart"),
    ("resp", "lungs"),
    ("pulm", "lungs"),
    ("abd", "abdomen"),
    ("gi", "abdomen"),
    ("neuro", "head"),
    ("msk", "back"),
    ("ext", "lowerExtremities"),
];

fn build_regions() -> Vec<AnatomicalRegion> {
    vec![
        AnatomicalRegion {
            id: "heart",
            terms: &[
                "heart",
                "cardiac",
                "cardiovascular",
                "murmur",
                "precordial",
                "palpitations",
            ],
            systems: &["cardiovascular"],
            relevance: RelevanceTier::Critical,
            base_priority: 2.0,
            default_views: &[DiagramView::Front],
        },
        AnatomicalRegion {
            id: "lungs",
            terms: &[
                "lung",
                "lungs",
                "respiratory",
                "pulmonary",
                "breath sounds",
                "wheeze",
                "wheezing",
            ],
            systems: &["respiratory"],
            relevance: RelevanceTier::Critical,
            base_priority: 2.0,
            default_views: &[DiagramView::Front, DiagramView::Back],
        },
        AnatomicalRegion {
            id: "head",
            terms: &["head", "skull", "scalp", "cranial", "face", "facial"],
            systems: &["neurological"],
            relevance: RelevanceTier::Critical,
            base_priority: 2.0,
            default_views: &[DiagramView::Front],
        },
        AnatomicalRegion {
            id: "chest",
            terms: &["chest", "thorax", "thoracic", "sternum", "ribs"],
            systems: &["cardiovascular", "respiratory"],
            relevance: RelevanceTier::High,
            base_priority: 3.0,
            default_views: &[DiagramView::Front],
        },
        AnatomicalRegion {
            id: "abdomen",
            terms: &[
                "abdomen",
                "abdominal",
                "stomach",
                "bowel",
                "liver",
                "spleen",
                "epigastric",
                "umbilical",
            ],
            systems: &["gastrointestinal"],
            relevance: RelevanceTier::High,
            base_priority: 3.0,
            default_views: &[DiagramView::Front],
        },
        AnatomicalRegion {
            id: "neck",
            terms: &["neck", "cervical", "throat", "thyroid"],
            systems: &["musculoskeletal", "endocrine"],
            relevance: RelevanceTier::Medium,
            base_priority: 4.0,
            default_views: &[DiagramView::Front],
        },
        AnatomicalRegion {
            id: "back",
            terms: &["back", "spine", "spinal", "lumbar", "vertebral", "scapula"],
            systems: &["musculoskeletal"],
            relevance: RelevanceTier::Medium,
            base_priority: 4.0,
            default_views: &[DiagramView::Back],
        },
        AnatomicalRegion {
            id: "pelvis",
            terms: &["pelvis", "pelvic", "groin", "inguinal", "hip"],
            systems: &["musculoskeletal", "genitourinary"],
            relevance: RelevanceTier::Medium,
            base_priority: 4.0,
            default_views: &[DiagramView::Front],
        },
        AnatomicalRegion {
            id: "upperExtremities",
            terms: &[
                "arm", "arms", "shoulder", "elbow", "forearm", "wrist", "hand", "hands", "finger",
                "fingers",
            ],
            systems: &["musculoskeletal"],
            relevance: RelevanceTier::Medium,
            base_priority: 4.0,
            default_views: &[DiagramView::Front],
        },
        AnatomicalRegion {
            id: "lowerExtremities",
            terms: &[
                "leg", "legs", "thigh", "knee", "knees", "calf", "ankle", "ankles", "foot", "feet",
                "toe", "toes",
            ],
            systems: &["musculoskeletal"],
            relevance: RelevanceTier::Medium,
            base_priority: 4.0,
            default_views: &[DiagramView::Front],
        },
        AnatomicalRegion {
            id: "skin",
            terms: &["skin", "rash", "lesion", "bruise", "bruising", "laceration"],
            systems: &["integumentary"],
            relevance: RelevanceTier::Medium,
            base_priority: 4.0,
            default_views: &[DiagramView::Front, DiagramView::Back],
        },
    ]
}

static CATALOG: Lazy<TerminologyCatalog> = Lazy::new(|| TerminologyCatalog {
    regions: build_regions(),
    severity_markers: SEVERITY_MARKERS,
    laterality_markers: LATERALITY_MARKERS,
    exam_method_markers: EXAM_METHOD_MARKERS,
    abbreviations: ABBREVIATIONS,
});

/// The shared default catalog.
pub fn catalog() -> &'static TerminologyCatalog {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let cat = catalog();
        assert!(cat.region("heart").is_some());
        assert!(cat.region("lowerExtremities").is_some());
        assert!(cat.region("spleen").is_none());
    }

    #[test]
    fn test_critical_regions_come_first() {
        let cat = catalog();
        let first_medium = cat
            .regions
            .iter()
            .position(|r| r.relevance == RelevanceTier::Medium)
            .unwrap();
        for region in &cat.regions[..first_medium] {
            assert_ne!(region.relevance, RelevanceTier::Medium);
        }
    }

    #[test]
    fn test_abbreviations_resolve_to_known_regions() {
        let cat = catalog();
        for (_, region_id) in cat.abbreviations {
            assert!(
                cat.region(region_id).is_some(),
                "abbreviation target {} not in catalog",
                region_id
            );
        }
    }

    #[test]
    fn test_base_priority_follows_relevance() {
        let cat = catalog();
        for region in &cat.regions {
            match region.relevance {
                RelevanceTier::Critical => assert_eq!(region.base_priority, 2.0),
                RelevanceTier::High => assert_eq!(region.base_priority, 3.0),
                RelevanceTier::Medium => assert_eq!(region.base_priority, 4.0),
            }
        }
    }
}
