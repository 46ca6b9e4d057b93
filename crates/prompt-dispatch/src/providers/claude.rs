//! Anthropic Messages API adapter.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::instruction::combined_prompt;
use crate::provider::{PromptAdapter, Provider};

use super::common::http::{decode_json, require_text, send_for_text};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
pub struct ClaudeRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
pub struct ClaudeMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ClaudeResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

impl ClaudeResponse {
    /// `content[0].text`
    pub fn first_text(&self) -> Option<&str> {
        self.content.first()?.text.as_deref()
    }
}

/// One user turn carrying the labeled instruction and the prompt.
pub fn build_claude_request(model: &str, max_tokens: u32, prompt: &str) -> ClaudeRequest {
    ClaudeRequest {
        model: model.to_string(),
        max_tokens,
        messages: vec![ClaudeMessage {
            role: "user",
            content: combined_prompt(prompt),
        }],
    }
}

pub struct ClaudeAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeAdapter {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: MAX_TOKENS,
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

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|_| DispatchError::MissingCredential(Provider::Claude))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl PromptAdapter for ClaudeAdapter {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    async fn rewrite(&self, prompt: &str) -> Result<String> {
        let label = Provider::Claude.label();
        let headers = self.build_headers()?;

        let request = self
            .client
            .post(format!("{}/messages", self.base_url.trim_end_matches('/')))
            .headers(headers)
            .json(&build_claude_request(&self.model, self.max_tokens, prompt));

        let body = send_for_text(label, request).await?;
        let response: ClaudeResponse = decode_json(label, &body)?;
        require_text(label, response.first_text())
    }
}
