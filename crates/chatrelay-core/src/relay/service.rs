//! Relay service: one user message in, one normalized reply out.
//!
//! Runs the linear pipeline LOAD_CONFIG -> LOAD_HISTORY ->
//! ROUTE_AND_CALL_UPSTREAM -> NORMALIZE_RESPONSE -> PERSIST_HISTORY. Any step
//! failing short-circuits; nothing is retried or rolled back.

use tracing::{Instrument, debug, info, info_span, warn};

use chatrelay_types::error::RelayError;

use crate::config::ConfigSource;
use crate::history::{HISTORY_TTL_SECS, HistoryStore, MAX_HISTORY_MESSAGES, append_exchange};
use crate::provider::ProviderKind;
use crate::provider::generate_content::GenerateContentResponse;
use crate::storage::kv_store::KvStore;
use crate::upstream::Upstream;

/// Tunables for the relay pipeline.
#[derive(Debug, Clone, Copy)]
pub struct RelaySettings {
    /// Prior turns sent upstream per request.
    pub max_history: usize,
    pub history_ttl_secs: u64,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            max_history: MAX_HISTORY_MESSAGES,
            history_ttl_secs: HISTORY_TTL_SECS,
        }
    }
}

/// Result of a successful relay.
#[derive(Debug, Clone)]
pub struct RelayReply {
    /// Assistant text with leading whitespace removed.
    pub text: String,
    pub provider: ProviderKind,
    /// Canonical envelope returned to the client.
    pub envelope: GenerateContentResponse,
}

/// Orchestrates a chat turn against the configured upstream.
///
/// Generic over its ports to keep chatrelay-core free of infra dependencies.
pub struct RelayService<K: KvStore, C: ConfigSource, U: Upstream> {
    history: HistoryStore<K>,
    config: C,
    upstream: U,
    settings: RelaySettings,
}

impl<K: KvStore, C: ConfigSource, U: Upstream> RelayService<K, C, U> {
    pub fn new(kv: K, config: C, upstream: U, settings: RelaySettings) -> Self {
        Self {
            history: HistoryStore::new(kv),
            config,
            upstream,
            settings,
        }
    }

    pub fn history(&self) -> &HistoryStore<K> {
        &self.history
    }

    pub fn config_source(&self) -> &C {
        &self.config
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Send `message` for `session_id` and record the exchange.
    pub async fn relay(&self, session_id: &str, message: &str) -> Result<RelayReply, RelayError> {
        let config = self.config.load().await?;

        // Never continue past a failed read; PERSIST overwrites the whole history.
        let history = self
            .history
            .get(session_id)
            .await
            .map_err(|e| RelayError::Unhandled(e.to_string()))?;

        let provider = ProviderKind::classify(&config.api_url);
        let request =
            provider.build_request(&config, &history, message, self.settings.max_history)?;

        let span = info_span!(
            "chat",
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = provider.name(),
            gen_ai.request.model = %config.model_name,
            gen_ai.request.temperature = config.temperature,
        );
        let reply = self.upstream.send(&request).instrument(span).await?;

        if !reply.is_success() {
            let message = reply.error_message();
            warn!(session_id, status = reply.status, %message, "Upstream returned an error");
            return Err(RelayError::Upstream {
                status: reply.status,
                message,
            });
        }

        let text = provider.extract_text(&reply.body)?;
        debug!(session_id, provider = provider.name(), chars = text.len(), "Upstream replied");

        let updated = append_exchange(history, message, &text, self.settings.max_history);
        match self
            .history
            .put(session_id, &updated, self.settings.history_ttl_secs)
            .await
        {
            Ok(()) => info!(session_id, turns = updated.len(), "History saved"),
            // The reply is still returned; this exchange is lost from future context.
            Err(e) => warn!(session_id, error = %e, "Failed to persist history"),
        }

        Ok(RelayReply {
            envelope: GenerateContentResponse::from_text(text.clone()),
            text,
            provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chatrelay_types::chat::Turn;
    use chatrelay_types::config::{RelayConfig, RelayConfigFile};
    use chatrelay_types::error::ConfigError;
    use secrecy::ExposeSecret;

    use crate::history::stored_limit;
    use crate::history::tests::MapStore;
    use crate::upstream::{UpstreamReply, UpstreamRequest};

    // --- Mock ports ---

    struct FixedConfig(RelayConfigFile);

    impl ConfigSource for FixedConfig {
        async fn load(&self) -> Result<RelayConfig, ConfigError> {
            self.0.clone().resolve()
        }
    }

    fn fixed(url: &str, persona: &str) -> FixedConfig {
        FixedConfig(RelayConfigFile {
            api_key: Some("k".into()),
            api_url: Some(url.into()),
            model_name: Some("m".into()),
            temperature: None,
            persona_prompt: Some(persona.into()),
        })
    }

    /// Records each request and answers with a canned reply.
    struct ScriptedUpstream {
        reply: UpstreamReply,
        seen: Mutex<Vec<(String, Option<String>, serde_json::Value)>>,
    }

    impl ScriptedUpstream {
        fn new(status: u16, body: serde_json::Value) -> Self {
            Self {
                reply: UpstreamReply {
                    status,
                    reason: "Reason".to_string(),
                    body,
                },
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Upstream for ScriptedUpstream {
        async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamReply, RelayError> {
            self.seen.lock().unwrap().push((
                request.url.clone(),
                request.bearer.as_ref().map(|b| b.expose_secret().to_string()),
                request.body.clone(),
            ));
            Ok(self.reply.clone())
        }
    }

    fn gemini_ok(text: &str) -> ScriptedUpstream {
        ScriptedUpstream::new(
            200,
            serde_json::json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}),
        )
    }

    #[tokio::test]
    async fn test_first_exchange_stores_two_turns() {
        let service = RelayService::new(
            MapStore::default(),
            fixed("https://generativelanguage.googleapis.com/v1beta", ""),
            gemini_ok("\nHello!"),
            RelaySettings::default(),
        );

        let reply = service.relay("s1", "Hi").await.unwrap();
        assert_eq!(reply.text, "Hello!");
        assert_eq!(reply.provider, ProviderKind::GenerateContent);

        let stored = service.history().get("s1").await.unwrap();
        assert_eq!(stored, vec![Turn::user("Hi"), Turn::model("Hello!")]);
        assert_eq!(
            *service.history().kv().last_ttl.lock().unwrap(),
            Some(HISTORY_TTL_SECS)
        );

        let seen = service.upstream.seen.lock().unwrap();
        assert!(seen[0].0.ends_with(":generateContent?key=k"));
    }

    #[tokio::test]
    async fn test_history_is_sent_and_bounded() {
        let settings = RelaySettings {
            max_history: 2,
            history_ttl_secs: 60,
        };
        let service = RelayService::new(
            MapStore::default(),
            fixed("https://example.com", ""),
            gemini_ok("ok"),
            settings,
        );

        for i in 0..10 {
            service.relay("s", &format!("q{i}")).await.unwrap();
            let stored = service.history().get("s").await.unwrap();
            assert!(stored.len() <= stored_limit(2));
        }

        let seen = service.upstream.seen.lock().unwrap();
        let last_body = &seen.last().unwrap().2;
        // two prior turns plus the new message
        assert_eq!(last_body["contents"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_chat_completions_gets_persona_and_bearer() {
        let upstream = ScriptedUpstream::new(
            200,
            serde_json::json!({"choices": [{"message": {"content": "Sure."}}]}),
        );
        let service = RelayService::new(
            MapStore::default(),
            fixed("https://api.x.ai/v1/chat/completions", "You are terse."),
            upstream,
            RelaySettings::default(),
        );

        let reply = service.relay("s", "Help?").await.unwrap();
        assert_eq!(reply.provider, ProviderKind::ChatCompletions);
        let envelope = serde_json::to_value(&reply.envelope).unwrap();
        assert_eq!(envelope["candidates"][0]["content"]["parts"][0]["text"], "Sure.");

        let seen = service.upstream.seen.lock().unwrap();
        assert_eq!(seen[0].1.as_deref(), Some("k"));
        assert_eq!(seen[0].2["messages"][0]["role"], "system");
        assert_eq!(seen[0].2["messages"][0]["content"], "You are terse.");
    }

    #[tokio::test]
    async fn test_upstream_error_skips_history_write() {
        let upstream =
            ScriptedUpstream::new(401, serde_json::json!({"error": {"message": "bad key"}}));
        let service = RelayService::new(
            MapStore::default(),
            fixed("https://example.com", ""),
            upstream,
            RelaySettings::default(),
        );

        let err = service.relay("s", "Hi").await.unwrap_err();
        assert_eq!(err.to_string(), "API error (401): bad key");
        assert!(service.history().kv().entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reply_is_error() {
        let service = RelayService::new(
            MapStore::default(),
            fixed("https://example.com", ""),
            gemini_ok("   "),
            RelaySettings::default(),
        );

        let err = service.relay("s", "Hi").await.unwrap_err();
        assert!(matches!(err, RelayError::EmptyResponse));
        assert!(service.history().kv().entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_config_never_calls_upstream() {
        let service = RelayService::new(
            MapStore::default(),
            FixedConfig(RelayConfigFile::default()),
            gemini_ok("unused"),
            RelaySettings::default(),
        );

        let err = service.relay("s", "Hi").await.unwrap_err();
        assert!(matches!(err, RelayError::Configuration(ConfigError::Missing(_))));
        assert_eq!(service.upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_history_read_failure_aborts_and_keeps_history() {
        let kv = MapStore {
            fail_reads: true,
            ..Default::default()
        };
        let seeded = serde_json::to_value(
            (0..20)
                .map(|i| Turn::user(format!("q{i}")))
                .collect::<Vec<_>>(),
        )
        .unwrap();
        kv.entries.lock().unwrap().insert("s".to_string(), seeded.clone());

        let service = RelayService::new(
            kv,
            fixed("https://example.com", ""),
            gemini_ok("unused"),
            RelaySettings::default(),
        );

        let err = service.relay("s", "Hi").await.unwrap_err();
        assert!(matches!(err, RelayError::Unhandled(ref m) if m.contains("read timeout")));
        assert_eq!(service.upstream.calls(), 0);
        assert_eq!(service.history().kv().entries.lock().unwrap().get("s"), Some(&seeded));
        assert!(service.history().kv().last_ttl.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persist_failure_still_returns_reply() {
        let kv = MapStore {
            fail_writes: true,
            ..Default::default()
        };
        let service = RelayService::new(
            kv,
            fixed("https://example.com", ""),
            gemini_ok("still here"),
            RelaySettings::default(),
        );

        let reply = service.relay("s", "Hi").await.unwrap();
        assert_eq!(reply.text, "still here");
    }
}
