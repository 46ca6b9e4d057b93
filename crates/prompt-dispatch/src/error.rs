use thiserror::Error;

use crate::provider::Provider;

/// Everything a single dispatch can fail with.
///
/// Configuration variants are produced before any network I/O. The `Display`
/// output of each variant is the human-readable message handed to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Please select an AI provider in settings")]
    ProviderNotSelected,

    #[error("Unknown provider selected: {0}")]
    UnknownProvider(String),

    #[error("Prompt text is empty")]
    EmptyPrompt,

    #[error("{} API Key not found. Please check settings.", .0.label())]
    MissingCredential(Provider),

    #[error("Custom API Endpoint not found. Please check settings.")]
    MissingEndpoint,

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Coarse classification of a [`DispatchError`], stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Http,
    Network,
    MalformedResponse,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderNotSelected
            | Self::UnknownProvider(_)
            | Self::EmptyPrompt
            | Self::MissingCredential(_)
            | Self::MissingEndpoint => ErrorKind::Configuration,
            Self::Http { .. } => ErrorKind::Http,
            Self::Network(_) => ErrorKind::Network,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Map a transport failure, translating connection failures into a
    /// message a user can act on.
    ///
    /// The request URL is dropped from the message since some providers carry
    /// the API key in the query string.
    pub fn from_transport(label: &str, err: reqwest::Error) -> Self {
        if err.is_connect() {
            return Self::Network(format!(
                "Network Error: Could not reach {label}. Please check your internet connection."
            ));
        }
        if err.is_timeout() {
            return Self::Network(format!("Network Error: {label} request timed out."));
        }
        Self::Network(format!("{label} request failed: {}", err.without_url()))
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
