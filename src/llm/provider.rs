//! Outbound model transport.
//!
//! One `complete` operation regardless of backend; the wire differences
//! between chat-completion, messages, and local-generate providers stay
//! inside this module.

use super::{BackendFamily, ModelConfig};
use crate::error::ModelError;
use serde_json::{json, Value};
use tracing::debug;

/// HTTP gateway to the configured model backend.
pub struct ModelGateway {
    client: reqwest::Client,
    config: ModelConfig,
}

impl ModelGateway {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Send one prompt, return the raw completion text.
    pub async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        debug!(model = self.config.model.api_name(), "model completion requested");
        match self.config.model.family() {
            BackendFamily::ChatCompletion => self.chat_completion(prompt).await,
            BackendFamily::Messages => self.messages(prompt).await,
            BackendFamily::LocalGenerate => self.local_generate(prompt).await,
        }
    }

    /// Cheap reachability probe. Remote backends are assumed reachable
    /// when credentials are present; the local backend is actually polled.
    pub async fn is_available(&self) -> bool {
        match self.config.model.family() {
            BackendFamily::LocalGenerate => {
                let url = format!("{}/api/tags", self.config.endpoint());
                self.client
                    .get(&url)
                    .send()
                    .await
                    .map(|r| r.status().is_success())
                    .unwrap_or(false)
            }
            _ => self.config.api_key.is_some(),
        }
    }

    fn require_key(&self) -> Result<&str, ModelError> {
        self.config.api_key.as_deref().ok_or_else(|| {
            ModelError::Configuration(format!(
                "{} requires an API key",
                self.config.model.api_name()
            ))
        })
    }

    async fn chat_completion(&self, prompt: &str) -> Result<String, ModelError> {
        let key = self.require_key()?;
        let url = format!("{}/v1/chat/completions", self.config.endpoint());
        let body = json!({
            "model": self.config.model.api_name(),
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let value: Value = response.json().await?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ModelError::Schema("chat completion reply had no message content".to_string())
            })
    }

    async fn messages(&self, prompt: &str) -> Result<String, ModelError> {
        let key = self.require_key()?;
        let url = format!("{}/v1/messages", self.config.endpoint());
        let body = json!({
            "model": self.config.model.api_name(),
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let value: Value = response.json().await?;
        value["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ModelError::Schema("messages reply had no text content".to_string()))
    }

    async fn local_generate(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!("{}/api/generate", self.config.endpoint());
        let body = json!({
            "model": self.config.model.api_name(),
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens,
            },
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let value: Value = response.json().await?;
        value["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ModelError::Schema("generate reply had no response field".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelKind;
    use std::time::Duration;

    fn local_config(endpoint: &str) -> ModelConfig {
        ModelConfig {
            enabled: true,
            endpoint: Some(endpoint.to_string()),
            timeout: Duration::from_secs(1),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_remote_backend_without_key_is_configuration_error() {
        let config = ModelConfig {
            enabled: true,
            model: ModelKind::Gpt4oMini,
            ..ModelConfig::default()
        };
        let gateway = ModelGateway::new(config).unwrap();
        assert!(matches!(
            gateway.require_key(),
            Err(ModelError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_local_backend_is_transport_error() {
        // Port 9 (discard) refuses connections immediately.
        let gateway = ModelGateway::new(local_config("http://127.0.0.1:9")).unwrap();
        let result = gateway.complete("hello").await;
        assert!(matches!(result, Err(ModelError::Transport(_))));
    }

    #[tokio::test]
    async fn test_unreachable_local_backend_reports_unavailable() {
        let gateway = ModelGateway::new(local_config("http://127.0.0.1:9")).unwrap();
        assert!(!gateway.is_available().await);
    }
}
