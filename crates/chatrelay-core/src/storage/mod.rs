//! Storage abstractions.

pub mod kv_store;
