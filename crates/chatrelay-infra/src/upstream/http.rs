//! reqwest-backed [`Upstream`] implementation.
//!
//! Posts the prepared JSON body and hands back status and body untouched;
//! classifying the reply is the relay's job. No timeout is configured beyond
//! reqwest's defaults and nothing is retried.

use secrecy::ExposeSecret;

use chatrelay_core::upstream::{Upstream, UpstreamReply, UpstreamRequest};
use chatrelay_types::error::RelayError;

/// Shared HTTP client for upstream calls.
#[derive(Clone, Default)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Upstream for HttpUpstream {
    async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamReply, RelayError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        if let Some(ref token) = request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }

        // Strip the URL from errors: it may carry the API key.
        let response = builder.send().await.map_err(|e| {
            RelayError::Unhandled(format!("upstream request failed: {}", e.without_url()))
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            RelayError::Unhandled(format!("failed to read upstream response: {}", e.without_url()))
        })?;
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        tracing::debug!(
            status = status.as_u16(),
            bytes = bytes.len(),
            "Upstream response received"
        );

        Ok(UpstreamReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
