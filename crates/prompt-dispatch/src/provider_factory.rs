//! Adapter Factory
//!
//! Builds the adapter for a [`Provider`] from the caller's [`ProviderConfig`].
//! Every configuration error is raised here, before any request is sent.

use reqwest::Client;

use crate::config::{non_empty, ApiKeyProviderConfig, ProviderConfig};
use crate::credential::resolve_fallback_key;
use crate::error::{DispatchError, Result};
use crate::provider::{PromptAdapter, Provider};
use crate::providers::{
    ClaudeAdapter, CustomAdapter, GeminiAdapter, OpenAIAdapter, OpenRouterAdapter,
};

/// Check the credential rules for `provider` without building anything.
pub fn validate_provider_config(provider: Provider, config: &ProviderConfig) -> Result<()> {
    if provider.requires_api_key() {
        return required_key(provider, config.keyed(provider)).map(|_| ());
    }
    match provider {
        Provider::Custom => custom_endpoint(config).map(|_| ()),
        _ => Ok(()),
    }
}

fn required_key(provider: Provider, section: Option<&ApiKeyProviderConfig>) -> Result<&str> {
    section
        .map(|c| c.api_key.trim())
        .filter(|key| !key.is_empty())
        .ok_or(DispatchError::MissingCredential(provider))
}

fn custom_endpoint(config: &ProviderConfig) -> Result<&str> {
    config
        .custom
        .as_ref()
        .map(|c| c.endpoint.trim())
        .filter(|endpoint| !endpoint.is_empty())
        .ok_or(DispatchError::MissingEndpoint)
}

/// Create the adapter for `provider`.
///
/// For [`Provider::Default`] this resolves the bundled key, which never fails.
pub async fn create_adapter(
    provider: Provider,
    config: &ProviderConfig,
    client: &Client,
) -> Result<Box<dyn PromptAdapter>> {
    let client = client.clone();

    match provider {
        Provider::Gemini => {
            let section = config.keyed(provider);
            let mut adapter = GeminiAdapter::new(client, required_key(provider, section)?);
            if let Some(url) = section.and_then(|c| non_empty(&c.base_url)) {
                adapter = adapter.with_base_url(url);
            }
            if let Some(model) = section.and_then(|c| non_empty(&c.model)) {
                adapter = adapter.with_model(model);
            }
            Ok(Box::new(adapter))
        }

        Provider::Claude => {
            let section = config.keyed(provider);
            let mut adapter = ClaudeAdapter::new(client, required_key(provider, section)?);
            if let Some(url) = section.and_then(|c| non_empty(&c.base_url)) {
                adapter = adapter.with_base_url(url);
            }
            if let Some(model) = section.and_then(|c| non_empty(&c.model)) {
                adapter = adapter.with_model(model);
            }
            Ok(Box::new(adapter))
        }

        Provider::OpenAI => {
            let section = config.keyed(provider);
            let mut adapter = OpenAIAdapter::new(client, required_key(provider, section)?);
            if let Some(url) = section.and_then(|c| non_empty(&c.base_url)) {
                adapter = adapter.with_base_url(url);
            }
            if let Some(model) = section.and_then(|c| non_empty(&c.model)) {
                adapter = adapter.with_model(model);
            }
            Ok(Box::new(adapter))
        }

        Provider::Custom => {
            let mut adapter = CustomAdapter::new(client, custom_endpoint(config)?);
            if let Some(custom) = &config.custom {
                if let Some(key) = non_empty(&custom.api_key) {
                    adapter = adapter.with_api_key(key);
                }
                if let Some(name) = non_empty(&custom.name) {
                    adapter = adapter.with_name(name);
                }
            }
            Ok(Box::new(adapter))
        }

        Provider::Default => {
            let key = resolve_fallback_key(&config.fallback_env_file()).await;
            let mut adapter = OpenRouterAdapter::new(client, key);
            if let Some(section) = &config.default {
                if let Some(url) = non_empty(&section.base_url) {
                    adapter = adapter.with_base_url(url);
                }
                if let Some(model) = non_empty(&section.model) {
                    adapter = adapter.with_model(model);
                }
            }
            Ok(Box::new(adapter))
        }
    }
}
