//! Prompt adapters
//!
//! One adapter per [`crate::Provider`] variant.

pub(crate) mod common;
pub mod claude;
pub mod custom;
pub mod gemini;
pub mod openai;
pub mod openrouter;

pub use claude::ClaudeAdapter;
pub use custom::CustomAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAIAdapter;
pub use openrouter::OpenRouterAdapter;
