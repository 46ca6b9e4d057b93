use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::provider::Provider;

/// One rewrite request: a non-empty prompt routed to one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationRequest {
    prompt_text: String,
    provider: Provider,
}

impl OptimizationRequest {
    pub fn new(prompt_text: impl Into<String>, provider: Provider) -> Result<Self> {
        let prompt_text = prompt_text.into();
        if prompt_text.trim().is_empty() {
            return Err(DispatchError::EmptyPrompt);
        }
        Ok(Self {
            prompt_text,
            provider,
        })
    }

    /// Build from a raw provider name as stored by a settings surface.
    pub fn parse(prompt_text: impl Into<String>, provider: &str) -> Result<Self> {
        Self::new(prompt_text, provider.parse()?)
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }
}

/// Inbound message from a UI caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(alias = "text")]
    pub prompt_text: String,
}

/// Outbound reply: `{"optimizedText": ..}` or `{"error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptimizeResponse {
    Optimized {
        #[serde(rename = "optimizedText")]
        optimized_text: String,
    },
    Failed {
        error: String,
    },
}

impl OptimizeResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl From<Result<String>> for OptimizeResponse {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(optimized_text) => Self::Optimized { optimized_text },
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}
