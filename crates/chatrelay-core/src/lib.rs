//! Request normalization and session bookkeeping for chatrelay.
//!
//! This crate defines the "ports" (`KvStore`, `ConfigSource`, `Upstream`)
//! that the infrastructure layer implements, plus the pure logic between
//! them. It depends only on `chatrelay-types` -- never on `chatrelay-infra`
//! or any database/HTTP crate.

pub mod config;
pub mod history;
pub mod provider;
pub mod relay;
pub mod session;
pub mod storage;
pub mod upstream;
