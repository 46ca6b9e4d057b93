//! Prompt optimization dispatcher.
//!
//! Selects the adapter for a request's provider, runs exactly one backend
//! call and hands back the rewritten text or a normalized error. The
//! dispatcher keeps no per-call state; only the HTTP client is shared.

use std::time::Instant;

use reqwest::Client;

use crate::config::{ProviderConfig, Settings};
use crate::error::{DispatchError, Result};
use crate::provider_factory::create_adapter;
use crate::types::{OptimizationRequest, OptimizeMessage, OptimizeResponse};

/// Trimmed, non-empty rewritten text or the reason there is none.
pub type OptimizationResult = Result<String>;

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn dispatch(
        &self,
        request: &OptimizationRequest,
        config: &ProviderConfig,
    ) -> OptimizationResult {
        let provider = request.provider();
        let adapter = create_adapter(provider, config, &self.client).await?;

        log::info!(
            "Optimizing prompt ({} chars) via {}",
            request.prompt_text().chars().count(),
            provider
        );
        let started = Instant::now();
        let result = adapter.rewrite(request.prompt_text()).await;

        match &result {
            Ok(text) => log::info!(
                "{} returned {} chars in {}ms",
                provider,
                text.chars().count(),
                started.elapsed().as_millis()
            ),
            Err(e) => log::warn!("{} failed ({:?}): {}", provider, e.kind(), e),
        }

        result
    }

    /// Serve one inbound message. Errors are folded into the response.
    ///
    /// The provider named in the message wins over the one stored in
    /// `settings`.
    pub async fn handle(&self, message: OptimizeMessage, settings: &Settings) -> OptimizeResponse {
        OptimizeResponse::from(self.handle_inner(message, settings).await)
    }

    async fn handle_inner(&self, message: OptimizeMessage, settings: &Settings) -> Result<String> {
        let provider = message
            .provider
            .filter(|p| !p.trim().is_empty())
            .or_else(|| settings.provider.clone())
            .ok_or(DispatchError::ProviderNotSelected)?;

        let request = OptimizationRequest::parse(message.prompt_text, &provider)?;
        self.dispatch(&request, &settings.providers).await
    }
}
