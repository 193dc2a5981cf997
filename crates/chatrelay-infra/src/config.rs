//! Relay configuration loader.
//!
//! Reads `relay.toml` from the data directory (`~/.chatrelay/` in production)
//! and overlays `CHATRELAY_*` environment variables on top. The file is
//! re-read on every request so edits take effect without a restart.

use std::path::{Path, PathBuf};

use chatrelay_core::config::ConfigSource;
use chatrelay_types::config::{RelayConfig, RelayConfigFile};
use chatrelay_types::error::ConfigError;

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "CHATRELAY";

/// Config file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "relay.toml";

/// Resolve the data directory.
///
/// Priority: `CHATRELAY_DATA_DIR`, then `~/.chatrelay`, then `./.chatrelay`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATRELAY_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".chatrelay");
    }

    PathBuf::from(".chatrelay")
}

/// `ConfigSource` backed by a TOML file plus environment overrides.
#[derive(Debug, Clone)]
pub struct TomlEnvConfigSource {
    path: PathBuf,
    env_prefix: String,
}

impl TomlEnvConfigSource {
    /// Read `relay.toml` from `data_dir`, with `CHATRELAY_*` overrides.
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(data_dir.join(CONFIG_FILE_NAME), DEFAULT_ENV_PREFIX)
    }

    pub fn with_path(path: impl Into<PathBuf>, env_prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            env_prefix: env_prefix.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file_layer(&self) -> Result<RelayConfigFile, ConfigError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No {} found, using environment only", self.path.display());
                return Ok(RelayConfigFile::default());
            }
            Err(err) => {
                return Err(ConfigError::Io(format!("{}: {err}", self.path.display())));
            }
        };

        toml::from_str(&content)
            .map_err(|err| ConfigError::Invalid(format!("{}: {err}", self.path.display())))
    }

    fn read_env_layer(&self) -> Result<RelayConfigFile, ConfigError> {
        let var = |name: &str| std::env::var(format!("{}_{name}", self.env_prefix)).ok();

        let temperature = match var("TEMPERATURE") {
            Some(raw) => Some(raw.trim().parse::<f64>().map_err(|e| {
                ConfigError::Invalid(format!("{}_TEMPERATURE: {e}", self.env_prefix))
            })?),
            None => None,
        };

        Ok(RelayConfigFile {
            api_key: var("API_KEY"),
            api_url: var("API_URL"),
            model_name: var("MODEL_NAME"),
            temperature,
            persona_prompt: var("PERSONA_PROMPT"),
        })
    }
}

impl ConfigSource for TomlEnvConfigSource {
    async fn load(&self) -> Result<RelayConfig, ConfigError> {
        let file = self.read_file_layer().await?;
        let env = self.read_env_layer()?;
        file.overlay(env).resolve()
    }
}
