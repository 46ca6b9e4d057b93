//! prompt-dispatch - rewrite a draft prompt through one of several LLM backends
//!
//! - `provider` - the closed [`Provider`] set and the [`PromptAdapter`] seam
//! - `providers` - one adapter per provider
//! - `provider_factory` - provider + config -> adapter, with fail-fast validation
//! - `dispatcher` - the single entry point callers use
//! - `config` - credentials and the settings file
//! - `credential` - bundled fallback key for the `default` provider

pub mod config;
pub mod credential;
pub mod dispatcher;
pub mod error;
pub mod instruction;
pub mod provider;
pub mod provider_factory;
pub mod providers;
pub mod types;

pub use config::{
    ApiKeyProviderConfig, ConfigError, CustomProviderConfig, DefaultProviderConfig,
    ProviderConfig, Settings,
};
pub use credential::{resolve_fallback_key, CredentialError, FALLBACK_OPENROUTER_KEY};
pub use dispatcher::{Dispatcher, OptimizationResult};
pub use error::{DispatchError, ErrorKind, Result};
pub use instruction::REWRITE_INSTRUCTION;
pub use provider::{PromptAdapter, Provider};
pub use provider_factory::{create_adapter, validate_provider_config};
pub use types::{OptimizationRequest, OptimizeMessage, OptimizeResponse};
