//! Provider credentials and the settings file they are loaded from.
//!
//! The dispatcher only ever borrows a [`ProviderConfig`]; loading and
//! environment overrides happen at the caller's edge.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::Provider;

const CONFIG_DIR_NAME: &str = ".prompt-optimizer";
const CONFIG_JSON_FILE: &str = "config.json";
const CONFIG_TOML_FILE: &str = "config.toml";
const FALLBACK_ENV_FILE: &str = ".env";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for a provider authenticated with a single API key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl ApiKeyProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// A caller-hosted, OpenAI-style endpoint. The key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomProviderConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl CustomProviderConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Overrides for the bundled aggregator backend. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultProviderConfig {
    #[serde(default)]
    pub env_file: Option<PathBuf>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Per-provider credential and endpoint bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub gemini: Option<ApiKeyProviderConfig>,
    #[serde(default)]
    pub claude: Option<ApiKeyProviderConfig>,
    #[serde(default)]
    pub openai: Option<ApiKeyProviderConfig>,
    #[serde(default)]
    pub custom: Option<CustomProviderConfig>,
    #[serde(default)]
    pub default: Option<DefaultProviderConfig>,
}

impl ProviderConfig {
    pub fn with_gemini(mut self, config: ApiKeyProviderConfig) -> Self {
        self.gemini = Some(config);
        self
    }

    pub fn with_claude(mut self, config: ApiKeyProviderConfig) -> Self {
        self.claude = Some(config);
        self
    }

    pub fn with_openai(mut self, config: ApiKeyProviderConfig) -> Self {
        self.openai = Some(config);
        self
    }

    pub fn with_custom(mut self, config: CustomProviderConfig) -> Self {
        self.custom = Some(config);
        self
    }

    pub fn with_default(mut self, config: DefaultProviderConfig) -> Self {
        self.default = Some(config);
        self
    }

    /// The key-authenticated section for `provider`, if it is one of those.
    pub fn keyed(&self, provider: Provider) -> Option<&ApiKeyProviderConfig> {
        match provider {
            Provider::Gemini => self.gemini.as_ref(),
            Provider::Claude => self.claude.as_ref(),
            Provider::OpenAI => self.openai.as_ref(),
            Provider::Custom | Provider::Default => None,
        }
    }

    fn keyed_mut(&mut self, provider: Provider) -> Option<&mut Option<ApiKeyProviderConfig>> {
        match provider {
            Provider::Gemini => Some(&mut self.gemini),
            Provider::Claude => Some(&mut self.claude),
            Provider::OpenAI => Some(&mut self.openai),
            Provider::Custom | Provider::Default => None,
        }
    }
}

/// Treat `Some("")` the same as `None`.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Persisted selection plus credentials, as written by a settings surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub providers: ProviderConfig,
}

/// Settings directory (~/.prompt-optimizer).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CONFIG_DIR_NAME)
}

pub fn config_json_path() -> PathBuf {
    config_dir().join(CONFIG_JSON_FILE)
}

/// Default location of the bundled fallback-key resource.
pub fn default_env_file_path() -> PathBuf {
    config_dir().join(FALLBACK_ENV_FILE)
}

impl Settings {
    /// Load `~/.prompt-optimizer/config.json`, else `./config.toml`, else
    /// defaults, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let json_path = config_json_path();
        let mut settings = if json_path.exists() {
            Self::load_from(&json_path)?
        } else if Path::new(CONFIG_TOML_FILE).exists() {
            Self::load_from(Path::new(CONFIG_TOML_FILE))?
        } else {
            log::debug!("No settings file found, using defaults");
            Self::default()
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Parse a settings file; `.json` as JSON, anything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let settings = if is_json {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    pub(crate) fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("PROMPT_OPTIMIZER_PROVIDER") {
            self.provider = Some(provider);
        }

        for (provider, var) in [
            (Provider::Gemini, "GEMINI_API_KEY"),
            (Provider::Claude, "ANTHROPIC_API_KEY"),
            (Provider::OpenAI, "OPENAI_API_KEY"),
        ] {
            if let (Some(key), Some(slot)) = (lookup(var), self.providers.keyed_mut(provider)) {
                slot.get_or_insert_with(Default::default).api_key = key;
            }
        }

        if let Some(endpoint) = lookup("CUSTOM_API_ENDPOINT") {
            self.providers
                .custom
                .get_or_insert_with(Default::default)
                .endpoint = endpoint;
        }
        if let Some(key) = lookup("CUSTOM_API_KEY") {
            self.providers
                .custom
                .get_or_insert_with(Default::default)
                .api_key = Some(key);
        }
        if let Some(path) = lookup("OPENROUTER_ENV_FILE") {
            self.providers
                .default
                .get_or_insert_with(Default::default)
                .env_file = Some(PathBuf::from(path));
        }
    }

    /// Where the `default` provider looks for its bundled key.
    pub fn fallback_env_file(&self) -> PathBuf {
        self.providers.fallback_env_file()
    }
}

impl ProviderConfig {
    pub fn fallback_env_file(&self) -> PathBuf {
        self.default
            .as_ref()
            .and_then(|d| d.env_file.clone())
            .unwrap_or_else(default_env_file_path)
    }
}
