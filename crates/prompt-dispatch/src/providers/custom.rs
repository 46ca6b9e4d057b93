//! Adapter for a caller-hosted endpoint with no guaranteed schema.
//!
//! The request is the OpenAI chat shape. The reply is read permissively:
//! a non-blank `choices[0].message.content`, then a non-blank flat `response`
//! string, then the serialized body itself.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::Result;
use crate::provider::{PromptAdapter, Provider};

use super::common::http::{require_text, send_for_text};
use super::common::openai_compat::{build_rewrite_body, first_content_in};

pub struct CustomAdapter {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    label: String,
}

impl CustomAdapter {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
            label: Provider::Custom.label().to_string(),
        }
    }

    /// Send `Authorization: Bearer` only when a key is configured.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Display name used in logs and error messages.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.label = name.into();
        self
    }
}

/// Pull rewritten text out of whatever a custom endpoint returned.
pub fn extract_custom_text(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let non_blank = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };

    first_content_in(&value)
        .and_then(non_blank)
        .or_else(|| value.get("response").and_then(Value::as_str).and_then(non_blank))
        .unwrap_or_else(|| value.to_string())
}

#[async_trait]
impl PromptAdapter for CustomAdapter {
    fn provider(&self) -> Provider {
        Provider::Custom
    }

    async fn rewrite(&self, prompt: &str) -> Result<String> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&build_rewrite_body(None, prompt));

        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let body = send_for_text(&self.label, request).await?;
        let text = extract_custom_text(&body);
        require_text(&self.label, Some(text.as_str()))
    }
}
