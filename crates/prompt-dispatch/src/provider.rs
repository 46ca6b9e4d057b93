use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// The closed set of backends a prompt can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    Claude,
    #[serde(rename = "openai")]
    OpenAI,
    Custom,
    /// Bundled aggregator backend that needs no caller credential.
    Default,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Gemini,
        Provider::Claude,
        Provider::OpenAI,
        Provider::Custom,
        Provider::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
            Provider::OpenAI => "openai",
            Provider::Custom => "custom",
            Provider::Default => "default",
        }
    }

    /// Human-readable name used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Gemini => "Gemini",
            Provider::Claude => "Claude",
            Provider::OpenAI => "OpenAI",
            Provider::Custom => "Custom",
            Provider::Default => "OpenRouter",
        }
    }

    /// Whether the caller must supply an API key for this provider.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Provider::Gemini | Provider::Claude | Provider::OpenAI)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "claude" => Ok(Provider::Claude),
            "openai" => Ok(Provider::OpenAI),
            "custom" => Ok(Provider::Custom),
            "default" => Ok(Provider::Default),
            "" => Err(DispatchError::ProviderNotSelected),
            _ => Err(DispatchError::UnknownProvider(s.to_string())),
        }
    }
}

/// Provider-specific request building, authentication and result extraction.
///
/// Implementations hold only an HTTP client handle and immutable credentials,
/// so a single adapter may serve overlapping calls.
#[async_trait]
pub trait PromptAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    /// Send the rewrite instruction plus `prompt` and return the trimmed,
    /// non-empty rewritten text.
    async fn rewrite(&self, prompt: &str) -> Result<String>;
}
