//! Gemini-style `generateContent` wire format.
//!
//! Request: `{contents, generationConfig: {temperature}}`, key in the query
//! string. Response: `candidates[0].content.parts[0].text`.
//!
//! The same envelope is the canonical response shape returned to clients
//! regardless of which upstream answered, and the inbound request body
//! reuses [`Content`].

use serde::{Deserialize, Serialize};

use chatrelay_types::chat::{Turn, TurnRole};

use crate::history::recent;

/// Request body for a `generateContent` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub temperature: f64,
}

/// One conversation entry: a role and its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

impl Content {
    fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Text of the first part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.parts.first().map(|p| p.text.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, if any.
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
    }

    /// Canonical single-candidate envelope carrying `text`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content::text("model", text)),
            }],
        }
    }
}

/// Build the contents list: the last `max_history` turns, then the new user
/// message. No persona is injected for this format.
pub fn format_contents(history: &[Turn], message: &str, max_history: usize) -> Vec<Content> {
    let window = recent(history, max_history);
    let mut contents = Vec::with_capacity(window.len() + 1);

    contents.extend(window.iter().map(|turn| {
        let role = match turn.role {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        };
        Content::text(role, turn.text.clone())
    }));
    contents.push(Content::text("user", message));

    contents
}
