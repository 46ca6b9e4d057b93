//! Bundled OpenRouter backend used by the `default` provider.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::Result;
use crate::provider::{PromptAdapter, Provider};

use super::common::http::{decode_json, require_text, send_for_text};
use super::common::openai_compat::{build_rewrite_body, ChatCompletionResponse};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "xiaomi/mimo-v2-flash:free";
pub const REFERER: &str = "https://prompt-optimizer.local";
pub const TITLE: &str = "Prompt Optimizer Extension";

/// Chat body with extended reasoning switched on.
pub fn build_openrouter_body(model: &str, prompt: &str) -> Value {
    let mut body = build_rewrite_body(Some(model), prompt);
    body["reasoning"] = json!({ "enabled": true });
    body
}

pub struct OpenRouterAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenRouterAdapter {
    /// `api_key` is the already-resolved fallback key.
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl PromptAdapter for OpenRouterAdapter {
    fn provider(&self) -> Provider {
        Provider::Default
    }

    async fn rewrite(&self, prompt: &str) -> Result<String> {
        let label = Provider::Default.label();

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&build_openrouter_body(&self.model, prompt));

        let text = send_for_text(label, request).await.map_err(|e| {
            log::error!("OpenRouter request failed: {}", e);
            e
        })?;
        let response: ChatCompletionResponse = decode_json(label, &text)?;
        require_text(label, response.first_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::REWRITE_INSTRUCTION;

    #[test]
    fn test_body_requests_reasoning() {
        let body = build_openrouter_body(DEFAULT_MODEL, "plan a trip");
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["reasoning"]["enabled"], true);
        assert_eq!(body["messages"][0]["content"], REWRITE_INSTRUCTION);
        assert_eq!(body["messages"][1]["content"], "plan a trip");
    }

    #[test]
    fn test_default_values() {
        let adapter = OpenRouterAdapter::new(Client::new(), "sk-or-v1-x");
        assert_eq!(adapter.base_url, DEFAULT_BASE_URL);
        assert_eq!(adapter.model, DEFAULT_MODEL);
        assert_eq!(adapter.provider(), Provider::Default);
    }
}
