//! Configuration source port.

use chatrelay_types::config::RelayConfig;
use chatrelay_types::error::ConfigError;

/// Supplies the upstream configuration.
///
/// Called once per request; implementations must not assume the result is
/// cached by the caller.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<RelayConfig, ConfigError>> + Send;
}
