//! Application state wiring the relay service together.
//!
//! `RelayService` is generic over its store/config/upstream ports; AppState
//! pins it to the concrete infra implementations.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use chatrelay_core::relay::service::{RelayService, RelaySettings};
use chatrelay_core::session::SessionResolver;
use chatrelay_infra::config::TomlEnvConfigSource;
use chatrelay_infra::memory::MemoryKvStore;
use chatrelay_infra::sqlite::kv::SqliteKvStore;
use chatrelay_infra::sqlite::pool::DatabasePool;
use chatrelay_infra::store::{StoreBackend, StoreKind};
use chatrelay_infra::upstream::http::HttpUpstream;

/// Concrete relay service used by the HTTP handlers and CLI.
pub type ConcreteRelayService = RelayService<StoreBackend, TomlEnvConfigSource, HttpUpstream>;

/// Shared application state.
///
/// Used by both CLI commands and HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ConcreteRelayService>,
    pub sessions: Arc<SessionResolver>,
}

impl AppState {
    /// Wire state from already-constructed parts.
    pub fn new(
        store: StoreBackend,
        config: TomlEnvConfigSource,
        upstream: HttpUpstream,
        settings: RelaySettings,
    ) -> Self {
        Self {
            relay: Arc::new(RelayService::new(store, config, upstream, settings)),
            sessions: Arc::new(SessionResolver::default()),
        }
    }

    /// Start the periodic expiry sweep on the history store.
    pub fn spawn_purge_task(&self, every: Duration) -> JoinHandle<()> {
        self.relay.history().kv().spawn_purge_task(every)
    }

    /// Initialize state rooted at `data_dir`: open the store and point the
    /// config source at `<data_dir>/relay.toml`.
    ///
    /// Expired entries are not swept here; `serve` starts the purge task.
    pub async fn init(
        data_dir: &Path,
        store_kind: StoreKind,
        settings: RelaySettings,
    ) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;

        let store = match store_kind {
            StoreKind::Sqlite => {
                let pool = DatabasePool::open_in(data_dir).await?;
                StoreBackend::Sqlite(SqliteKvStore::new(pool))
            }
            StoreKind::Memory => StoreBackend::Memory(MemoryKvStore::new()),
        };

        tracing::debug!(
            store = %store_kind,
            data_dir = %data_dir.display(),
            "Application state initialized"
        );

        Ok(Self::new(
            store,
            TomlEnvConfigSource::new(data_dir),
            HttpUpstream::new(),
            settings,
        ))
    }
}
