//! Shared domain types for chatrelay.
//!
//! Conversation turns, relay configuration, and the error enums shared by
//! the core, infra and api crates.
//!
//! Zero infrastructure dependencies -- only serde, thiserror, secrecy.

pub mod chat;
pub mod config;
pub mod error;
