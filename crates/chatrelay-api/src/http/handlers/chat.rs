//! Chat relay endpoint.
//!
//! POST {chat_path}
//!
//! Body: `{"contents": [ ... {"parts": [{"text": "..."}]} ]}`; only the last
//! entry's first part is read as the new user message. The previous turns
//! come from the session's stored history, not the request.
//!
//! Response: `{"candidates": [{"content": {"parts": [{"text": "..."}], "role": "model"}}]}`
//! with `Set-Cookie` when the session was minted for this request.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use chatrelay_core::provider::generate_content::Content;
use chatrelay_types::error::RelayError;

use crate::http::error::AppError;
use crate::state::AppState;

/// Inbound request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub contents: Vec<Content>,
}

impl ChatRequest {
    /// The last entry's first part text.
    pub fn latest_message(&self) -> Option<&str> {
        self.contents.last().and_then(Content::first_text)
    }
}

/// Parse the request body and pull out the new user message.
pub fn parse_message(body: &[u8]) -> Result<String, RelayError> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| RelayError::Unhandled(format!("invalid request body: {e}")))?;

    request
        .latest_message()
        .map(str::to_string)
        .ok_or_else(|| RelayError::Unhandled("request body contains no message text".to_string()))
}

/// Join every `Cookie` header; HTTP/2 clients may split them.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

/// ANY {chat_path} — relay one chat message.
pub async fn handle_chat(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    if method != Method::POST {
        return Err(RelayError::MethodNotAllowed.into());
    }

    let identity = state.sessions.resolve(cookie_header(&headers).as_deref());
    let message = parse_message(&body)?;

    let reply = state.relay.relay(&identity.id, &message).await?;

    let mut response = Json(reply.envelope).into_response();
    if identity.is_new {
        let cookie = HeaderValue::from_str(&state.sessions.set_cookie_header(&identity.id))
            .map_err(|e| RelayError::Unhandled(format!("invalid session cookie: {e}")))?;
        response.headers_mut().insert(header::SET_COOKIE, cookie);
        tracing::info!(session_id = %identity.id, "New chat session");
    }

    Ok(response)
}
