//! Fallback key resolution for the bundled aggregator backend.
//!
//! Resolution is a two-step chain: read the bundled resource, and if that
//! step fails for any reason use the compiled-in constant.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Last-resort key. Packagers may embed their own at build time through
/// `PROMPT_OPTIMIZER_FALLBACK_KEY`.
pub const FALLBACK_OPENROUTER_KEY: &str = match option_env!("PROMPT_OPTIMIZER_FALLBACK_KEY") {
    Some(key) if !key.is_empty() => key,
    _ => "sk-or-v1-prompt-optimizer-bundled-fallback",
};

lazy_static! {
    static ref OPENROUTER_KEY_LINE: Regex =
        Regex::new(r"OPENROUTER_API_KEY=(.*)").expect("static regex is valid");
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No OPENROUTER_API_KEY entry in {0}")]
    PatternNotFound(PathBuf),

    #[error("OPENROUTER_API_KEY in {0} is empty")]
    EmptyValue(PathBuf),
}

/// Extract the value of the first `OPENROUTER_API_KEY=` entry.
///
/// Returns `None` when no entry exists and `Some("")` when the entry is blank.
pub fn parse_key_line(text: &str) -> Option<String> {
    let captures = OPENROUTER_KEY_LINE.captures(text)?;
    let value = captures.get(1).map_or("", |m| m.as_str()).trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Some(value.trim().to_string())
}

/// Step one: the bundled resource.
pub async fn read_key_from_resource(path: &Path) -> Result<String, CredentialError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    match parse_key_line(&text) {
        None => Err(CredentialError::PatternNotFound(path.to_path_buf())),
        Some(key) if key.is_empty() => Err(CredentialError::EmptyValue(path.to_path_buf())),
        Some(key) => Ok(key),
    }
}

/// Resolve a key for the aggregator backend. Never fails and never returns an
/// empty string.
pub async fn resolve_fallback_key(resource: &Path) -> String {
    read_key_from_resource(resource)
        .await
        .map(|key| {
            log::debug!("Using OpenRouter key from {}", resource.display());
            key
        })
        .unwrap_or_else(|e| {
            log::warn!("{}; using built-in OpenRouter key", e);
            FALLBACK_OPENROUTER_KEY.to_string()
        })
}
