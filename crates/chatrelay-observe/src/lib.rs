//! Tracing and OpenTelemetry setup for chatrelay.

pub mod tracing_setup;
