//! Shared helpers for adapter implementations.

pub mod http;
pub mod openai_compat;
