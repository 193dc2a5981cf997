//! Outbound HTTP port for the conversational AI upstream.

use chatrelay_types::error::RelayError;
use secrecy::SecretString;

/// A fully built upstream call.
///
/// Intentionally does NOT derive Debug: for generateContent upstreams the
/// API key is part of `url`.
pub struct UpstreamRequest {
    pub url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub bearer: Option<SecretString>,
    pub body: serde_json::Value,
}

/// The upstream's answer, successful or not.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    /// Canonical reason phrase for `status` (e.g. "Unauthorized").
    pub reason: String,
    /// Response body parsed as JSON; `Null` when it was not JSON.
    pub body: serde_json::Value,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Message for a failed reply: the body's `error.message` when present,
    /// otherwise the status reason.
    pub fn error_message(&self) -> String {
        self.body
            .pointer("/error/message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.reason.clone())
    }
}

/// Sends a POST with a JSON body and returns whatever came back.
///
/// Only transport failures are errors here; non-2xx statuses are returned as
/// an [`UpstreamReply`] for the caller to classify.
pub trait Upstream: Send + Sync {
    fn send(
        &self,
        request: &UpstreamRequest,
    ) -> impl std::future::Future<Output = Result<UpstreamReply, RelayError>> + Send;
}
