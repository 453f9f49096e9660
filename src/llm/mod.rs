//! Model gateway - constrained prompting, validation, and merging.
//!
//! The probabilistic path. One outbound HTTP call per analysis request,
//! a strict JSON contract on the reply, and a merge policy that never
//! lets unvalidated model output reach the caller.

pub mod merge;
pub mod provider;
pub mod validate;

pub use provider::ModelGateway;
pub use validate::ModelAnalysis;

use crate::types::DiagramView;
use std::time::Duration;

/// Default bound on the outbound model call. 30 seconds keeps a slow
/// provider from stalling a request indefinitely while leaving room for
/// large completions.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f64 = 0.1;

/// Supported model backends, one per wire family. The router never
/// branches on these; it only calls `ModelGateway::complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// OpenAI-style chat completions.
    Gpt4oMini,
    Gpt4o,
    /// Anthropic-style messages.
    ClaudeHaiku,
    ClaudeSonnet,
    /// Local Ollama-style generation.
    Llama3,
    Mistral,
}

/// Wire family a model speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFamily {
    ChatCompletion,
    Messages,
    LocalGenerate,
}

impl ModelKind {
    pub fn family(&self) -> BackendFamily {
        match self {
            ModelKind::Gpt4oMini | ModelKind::Gpt4o => BackendFamily::ChatCompletion,
            ModelKind::ClaudeHaiku | ModelKind::ClaudeSonnet => BackendFamily::Messages,
            ModelKind::Llama3 | ModelKind::Mistral => BackendFamily::LocalGenerate,
        }
    }

    /// Model name as sent on the wire.
    pub fn api_name(&self) -> &'static str {
        match self {
            ModelKind::Gpt4oMini => "gpt-4o-mini",
            ModelKind::Gpt4o => "gpt-4o",
            ModelKind::ClaudeHaiku => "claude-3-5-haiku-latest",
            ModelKind::ClaudeSonnet => "claude-3-5-sonnet-latest",
            ModelKind::Llama3 => "llama3.1",
            ModelKind::Mistral => "mistral",
        }
    }

    /// Default endpoint for the family, overridable in `ModelConfig`.
    pub fn default_endpoint(&self) -> &'static str {
        match self.family() {
            BackendFamily::ChatCompletion => "https://api.openai.com",
            BackendFamily::Messages => "https://api.anthropic.com",
            BackendFamily::LocalGenerate => "http://127.0.0.1:11434",
        }
    }
}

/// Model configuration, set once at process start and read-only after.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: ModelKind,
    pub endpoint: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
    /// When the model path fails: fall back to the rule result (true) or
    /// to the generic recommendation (false). Either way the caller gets
    /// a non-empty result.
    pub fallback_to_rules: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model: ModelKind::Llama3,
            endpoint: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            fallback_to_rules: true,
        }
    }
}

impl ModelConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.model.default_endpoint())
    }
}

/// Build the constrained analysis prompt. The reply must be a single JSON
/// object using only the closed view vocabulary.
pub fn build_analysis_prompt(text: &str) -> String {
    let views: Vec<&str> = DiagramView::all().iter().map(|v| v.as_str()).collect();
    format!(
        r#"You are assisting with anatomical diagram selection for a medical examination note. Do not diagnose. Classify only.

NOTE:
"{}"

ALLOWED VIEW TYPES: {}

Respond with ONLY this JSON object, nothing else:
{{"analysis":"<one sentence>","recommendations":[{{"type":"<view>","priority":<1-10>,"findings":["<short phrase>"],"reason":"<short phrase>"}}],"reasoning":"<one sentence>","confidence":<0.0-1.0>}}

Rules:
- "type" must be one of the allowed view types.
- Lower priority means more important.
- At most 3 recommendations.

JSON:"#,
        text,
        views.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert_eq!(ModelKind::Gpt4oMini.family(), BackendFamily::ChatCompletion);
        assert_eq!(ModelKind::ClaudeHaiku.family(), BackendFamily::Messages);
        assert_eq!(ModelKind::Llama3.family(), BackendFamily::LocalGenerate);
    }

    #[test]
    fn test_endpoint_override() {
        let mut config = ModelConfig::default();
        assert_eq!(config.endpoint(), "http://127.0.0.1:11434");
        config.endpoint = Some("http://10.0.0.5:11434".to_string());
        assert_eq!(config.endpoint(), "http://10.0.0.5:11434");
    }

    #[test]
    fn test_prompt_carries_closed_vocabulary() {
        let prompt = build_analysis_prompt("chest pain");
        for view in DiagramView::all() {
            assert!(prompt.contains(view.as_str()));
        }
        assert!(prompt.contains("chest pain"));
        assert!(prompt.contains("ONLY this JSON object"));
    }
}
