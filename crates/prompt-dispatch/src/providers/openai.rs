use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::provider::{PromptAdapter, Provider};

use super::common::http::{decode_json, require_text, send_for_text};
use super::common::openai_compat::{build_rewrite_body, ChatCompletionResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub struct OpenAIAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIAdapter {
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
impl PromptAdapter for OpenAIAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn rewrite(&self, prompt: &str) -> Result<String> {
        let label = Provider::OpenAI.label();
        let body = build_rewrite_body(Some(&self.model), prompt);

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&body);

        let text = send_for_text(label, request).await?;
        let response: ChatCompletionResponse = decode_json(label, &text)?;
        require_text(label, response.first_content())
    }
}
