//! HTTP layer for chatrelay.
//!
//! A single chat endpoint plus `/health`. Errors are returned as
//! `{"error": "..."}`.

pub mod error;
pub mod handlers;
pub mod router;
