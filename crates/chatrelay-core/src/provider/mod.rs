//! Upstream protocol selection, request building and response normalization.
//!
//! Two heterogeneous upstream protocols are supported. [`ProviderKind`] is
//! chosen once per request from the configured URL and then threaded through
//! both request formatting and response extraction.

pub mod chat_completions;
pub mod generate_content;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use chatrelay_types::chat::Turn;
use chatrelay_types::config::RelayConfig;
use chatrelay_types::error::{ConfigError, RelayError};

use crate::upstream::UpstreamRequest;

use self::chat_completions::{ChatCompletionsRequest, ChatCompletionsResponse, format_messages};
use self::generate_content::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, format_contents,
};

/// URL fragments that identify a chat completions upstream.
const CHAT_COMPLETIONS_MARKERS: &[&str] = &["api.x.ai", "grok", "openai", "/chat/completions"];

/// Which upstream protocol a request speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI-style `messages` API with bearer auth.
    ChatCompletions,
    /// Gemini-style `contents` API with the key in the query string.
    GenerateContent,
}

impl ProviderKind {
    /// Classify an upstream by its base URL.
    ///
    /// Pure substring match: anything not recognized as chat completions is
    /// treated as generateContent, with no validation.
    pub fn classify(api_url: &str) -> Self {
        let url = api_url.to_ascii_lowercase();
        if CHAT_COMPLETIONS_MARKERS.iter().any(|m| url.contains(m)) {
            ProviderKind::ChatCompletions
        } else {
            ProviderKind::GenerateContent
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::ChatCompletions => "chat_completions",
            ProviderKind::GenerateContent => "generate_content",
        }
    }

    /// Build the upstream call for `message` on top of `history`.
    pub fn build_request(
        &self,
        config: &RelayConfig,
        history: &[Turn],
        message: &str,
        max_history: usize,
    ) -> Result<UpstreamRequest, RelayError> {
        match self {
            ProviderKind::ChatCompletions => {
                let body = ChatCompletionsRequest {
                    messages: format_messages(
                        history,
                        message,
                        &config.persona_prompt,
                        max_history,
                    ),
                    model: config.model_name.clone(),
                    temperature: config.temperature,
                    stream: false,
                };
                Ok(UpstreamRequest {
                    url: config.api_url.trim_end_matches('/').to_string(),
                    bearer: Some(SecretString::from(config.api_key.expose_secret().to_string())),
                    body: to_json(&body)?,
                })
            }
            ProviderKind::GenerateContent => {
                let body = GenerateContentRequest {
                    contents: format_contents(history, message, max_history),
                    generation_config: GenerationConfig {
                        temperature: config.temperature,
                    },
                };
                Ok(UpstreamRequest {
                    url: generate_content_url(config)?,
                    bearer: None,
                    body: to_json(&body)?,
                })
            }
        }
    }

    /// Pull the assistant text out of a successful upstream body.
    ///
    /// Leading whitespace is stripped; a missing or blank text is
    /// [`RelayError::EmptyResponse`].
    pub fn extract_text(&self, body: &serde_json::Value) -> Result<String, RelayError> {
        let text = match self {
            ProviderKind::ChatCompletions => ChatCompletionsResponse::deserialize(body)
                .ok()
                .and_then(ChatCompletionsResponse::first_content),
            ProviderKind::GenerateContent => GenerateContentResponse::deserialize(body)
                .ok()
                .and_then(GenerateContentResponse::first_text),
        };

        text.map(|t| t.trim_start().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(RelayError::EmptyResponse)
    }
}

/// `<api_url>/models/<model>:generateContent?key=<api_key>`, with the model
/// and key percent-encoded.
fn generate_content_url(config: &RelayConfig) -> Result<String, RelayError> {
    let invalid = |reason: String| {
        RelayError::Configuration(ConfigError::Invalid(format!("api_url: {reason}")))
    };

    let mut url = Url::parse(&config.api_url).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("cannot be a base URL".to_string()))?
        .pop_if_empty()
        .push("models")
        .push(&format!("{}:generateContent", config.model_name));
    url.query_pairs_mut()
        .append_pair("key", config.api_key.expose_secret());

    Ok(url.into())
}

fn to_json<T: serde::Serialize>(body: &T) -> Result<serde_json::Value, RelayError> {
    serde_json::to_value(body)
        .map_err(|e| RelayError::Unhandled(format!("failed to encode request: {e}")))
}
