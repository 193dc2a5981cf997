//! HTTP application layer for chatrelay.
//!
//! Exposes the axum router and application state so the `chatrelay` binary
//! and the integration tests build the same service.

pub mod http;
pub mod state;
