//! Infrastructure layer for chatrelay.
//!
//! Contains implementations of the ports defined in `chatrelay-core`:
//! SQLite and in-memory key-value stores, the TOML/environment config
//! source, and the reqwest-based upstream client.

pub mod config;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod upstream;
