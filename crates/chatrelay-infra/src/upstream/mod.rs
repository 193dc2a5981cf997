//! Upstream HTTP client implementations.

pub mod http;
