//! Relay configuration types.
//!
//! [`RelayConfigFile`] is the loosely-typed shape read from `relay.toml` and
//! environment variables; every field is optional so layers can be merged.
//! [`RelayConfig`] is the validated form the relay works with.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Validated upstream configuration for a single request.
///
/// Does not implement `Clone`; it is loaded fresh for every request.
#[derive(Debug)]
pub struct RelayConfig {
    /// Upstream API key. Never logged.
    pub api_key: SecretString,
    /// Upstream base URL. Its contents decide which protocol is spoken.
    pub api_url: String,
    pub model_name: String,
    pub temperature: f64,
    /// Operator-supplied system instruction. Empty means none.
    pub persona_prompt: String,
}

/// A partial configuration layer (file or environment).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfigFile {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub persona_prompt: Option<String>,
}

impl RelayConfigFile {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn overlay(self, other: RelayConfigFile) -> RelayConfigFile {
        RelayConfigFile {
            api_key: other.api_key.or(self.api_key),
            api_url: other.api_url.or(self.api_url),
            model_name: other.model_name.or(self.model_name),
            temperature: other.temperature.or(self.temperature),
            persona_prompt: other.persona_prompt.or(self.persona_prompt),
        }
    }

    /// Validate into a [`RelayConfig`].
    ///
    /// `api_key` and `api_url` are required; blank values count as missing.
    pub fn resolve(self) -> Result<RelayConfig, ConfigError> {
        let api_key = non_blank(self.api_key).ok_or(ConfigError::Missing("api_key"))?;
        let api_url = non_blank(self.api_url).ok_or(ConfigError::Missing("api_url"))?;

        Ok(RelayConfig {
            api_key: SecretString::from(api_key),
            api_url,
            model_name: self.model_name.unwrap_or_default(),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            persona_prompt: self.persona_prompt.unwrap_or_default(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_deserialize_partial_toml() {
        let file: RelayConfigFile = toml::from_str(
            r#"
api_url = "https://generativelanguage.googleapis.com/v1beta"
model_name = "gemini-2.0-flash"
"#,
        )
        .unwrap();
        assert!(file.api_key.is_none());
        assert_eq!(file.model_name.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_overlay_prefers_upper_layer() {
        let base = RelayConfigFile {
            api_key: Some("file-key".into()),
            model_name: Some("file-model".into()),
            temperature: Some(0.2),
            ..Default::default()
        };
        let env = RelayConfigFile {
            api_key: Some("env-key".into()),
            ..Default::default()
        };

        let merged = base.overlay(env);
        assert_eq!(merged.api_key.as_deref(), Some("env-key"));
        assert_eq!(merged.model_name.as_deref(), Some("file-model"));
        assert_eq!(merged.temperature, Some(0.2));
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let config = RelayConfigFile {
            api_key: Some("k".into()),
            api_url: Some("https://api.x.ai/v1/chat/completions".into()),
            ..Default::default()
        }
        .resolve()
        .unwrap();

        assert_eq!(config.api_key.expose_secret(), "k");
        assert!((config.temperature - DEFAULT_TEMPERATURE).abs() < f64::EPSILON);
        assert!(config.persona_prompt.is_empty());
        assert!(config.model_name.is_empty());
    }

    #[test]
    fn test_resolve_requires_key_and_url() {
        let err = RelayConfigFile {
            api_url: Some("https://example.com".into()),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("api_key")));

        let err = RelayConfigFile {
            api_key: Some("k".into()),
            api_url: Some("   ".into()),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("api_url")));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = RelayConfigFile {
            api_key: Some("super-secret".into()),
            api_url: Some("https://example.com".into()),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
