//! Fallback guarantees of the hybrid analyzer.
//!
//! The model path is pointed at endpoints that cannot answer; every case
//! must degrade to a usable rules result without surfacing an error.

use anatomap::{AnalysisMethod, Analyzer, DiagramView, ModelConfig, ModelKind};
use std::time::Duration;

/// A note complex enough to trigger the model path.
const COMPLEX_NOTE: &str =
    "Severe chest pain with abdominal guarding and bilateral leg edema, worse on the left. \
     Skin shows new erythema. Possibly cardiac in origin, but the picture is unclear.";

fn unreachable_config(model: ModelKind) -> ModelConfig {
    ModelConfig {
        enabled: true,
        model,
        // Discard port: connections are refused immediately.
        endpoint: Some("http://127.0.0.1:9".to_string()),
        api_key: Some("test-key".to_string()),
        timeout: Duration::from_secs(2),
        ..ModelConfig::default()
    }
}

#[tokio::test]
async fn transport_failure_falls_back_to_rules() {
    let analyzer = Analyzer::with_config(unreachable_config(ModelKind::Llama3));
    let result = analyzer.analyze(COMPLEX_NOTE).await;

    assert_eq!(result.method, AnalysisMethod::Rules);
    assert!(!result.recommendations.is_empty());
    assert!(result.recommendations.len() <= 3);
    for rec in &result.recommendations {
        assert!(DiagramView::all().contains(&rec.view));
    }
}

#[tokio::test]
async fn every_backend_family_fails_closed() {
    for model in [ModelKind::Gpt4oMini, ModelKind::ClaudeHaiku, ModelKind::Llama3] {
        let analyzer = Analyzer::with_config(unreachable_config(model));
        let result = analyzer.analyze(COMPLEX_NOTE).await;
        assert_eq!(result.method, AnalysisMethod::Rules, "model {:?}", model);
        assert!(!result.recommendations.is_empty());
    }
}

#[tokio::test]
async fn missing_key_is_caught_not_surfaced() {
    let config = ModelConfig {
        api_key: None,
        ..unreachable_config(ModelKind::Gpt4oMini)
    };
    let analyzer = Analyzer::with_config(config);
    let result = analyzer.analyze(COMPLEX_NOTE).await;
    assert_eq!(result.method, AnalysisMethod::Rules);
    assert!(!result.recommendations.is_empty());
}

#[tokio::test]
async fn strict_fallback_mode_degrades_to_generic_view() {
    let config = ModelConfig {
        fallback_to_rules: false,
        ..unreachable_config(ModelKind::Llama3)
    };
    let analyzer = Analyzer::with_config(config);
    let result = analyzer.analyze(COMPLEX_NOTE).await;

    assert_eq!(result.method, AnalysisMethod::Rules);
    assert_eq!(result.recommendations.len(), 1);
    assert_eq!(result.recommendations[0].view, DiagramView::Front);
    assert_eq!(result.confidence, 0.5);
}

#[tokio::test]
async fn simple_note_never_attempts_model_call() {
    // The endpoint would refuse the connection, but a simple note must not
    // reach it in the first place; the result is pure rules either way.
    let analyzer = Analyzer::with_config(unreachable_config(ModelKind::Llama3));
    let result = analyzer.analyze("Mild knee swelling.").await;
    assert_eq!(result.method, AnalysisMethod::Rules);
    assert_eq!(result.recommendations.len(), 1);
}
