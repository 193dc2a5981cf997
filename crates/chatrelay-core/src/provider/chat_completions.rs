//! OpenAI-style chat completions wire format (xAI Grok, OpenAI and friends).
//!
//! Request: `{messages, model, temperature, stream: false}` with bearer auth.
//! Response: `choices[0].message.content`.

use serde::{Deserialize, Serialize};

use chatrelay_types::chat::{Turn, TurnRole};

use crate::history::recent;

/// Request body for a chat completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionsRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f64,
    pub stream: bool,
}

/// A single message in a chat completions conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionsResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatCompletionsResponse {
    /// Content of the first choice, if any.
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
    }
}

/// Build the message list: persona as a leading system entry (when set),
/// then the last `max_history` turns, then the new user message.
pub fn format_messages(
    history: &[Turn],
    message: &str,
    persona: &str,
    max_history: usize,
) -> Vec<ChatMessage> {
    let window = recent(history, max_history);
    let mut messages = Vec::with_capacity(window.len() + 2);

    if !persona.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: persona.to_string(),
        });
    }

    messages.extend(window.iter().map(|turn| ChatMessage {
        role: match turn.role {
            TurnRole::User => "user",
            TurnRole::Model => "assistant",
        },
        content: turn.text.clone(),
    }));

    messages.push(ChatMessage {
        role: "user",
        content: message.to_string(),
    });

    messages
}
