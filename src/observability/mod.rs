//! Observability subsystem.
//!
//! Structured logging is handled by `tracing` throughout the crate and
//! initialized in `main`; this module carries the metrics exporter.

pub mod metrics;
