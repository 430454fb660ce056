//! Coaching reports written by a local language model through Ollama.

use std::time::Duration;

use volley_core::coach::{build_coaching_prompt, AnalysisError, Coach};
use volley_core::ollama::OllamaClient;
use volley_core::MatchData;

#[derive(Debug, Clone)]
pub struct LlmCoach {
    client: OllamaClient,
}

impl LlmCoach {
    /// Coach backed by `model` on the Ollama server at `host`.
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: OllamaClient::new(host, model),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            client: self.client.with_timeout(timeout),
        }
    }

    /// The underlying client.
    pub fn client(&self) -> &OllamaClient {
        &self.client
    }
}

impl Coach for LlmCoach {
    fn name(&self) -> &'static str {
        "llm-coach"
    }

    fn analyze(&self, data: &MatchData) -> Result<String, AnalysisError> {
        let prompt = build_coaching_prompt(data);
        tracing::debug!(
            host = self.client.host(),
            model = self.client.model(),
            "requesting coaching report"
        );
        let text = self.client.generate(&prompt)?;
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        Ok(text)
    }
}
