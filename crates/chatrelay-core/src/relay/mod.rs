//! Per-request orchestration of config, history and upstream.

pub mod service;
