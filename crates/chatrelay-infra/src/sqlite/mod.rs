//! SQLite storage implementations.

pub mod kv;
pub mod pool;
