//! Chat-completions request/response shapes shared by the OpenAI, custom and
//! aggregator adapters.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::instruction::REWRITE_INSTRUCTION;

/// Two-message body: the instruction as the system turn, the raw prompt as
/// the user turn. `model` is omitted when `None`.
pub fn build_rewrite_body(model: Option<&str>, prompt: &str) -> Value {
    let mut body = json!({
        "messages": [
            { "role": "system", "content": REWRITE_INSTRUCTION },
            { "role": "user", "content": prompt },
        ],
    });

    if let Some(model) = model {
        body["model"] = json!(model);
    }

    body
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// `choices[0].message.content`, if present.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
    }
}

/// `choices[0].message.content` read from an untyped body.
pub fn first_content_in(value: &Value) -> Option<&str> {
    value.pointer("/choices/0/message/content")?.as_str()
}
