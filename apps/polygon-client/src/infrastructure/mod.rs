//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete clients for the three vendor surfaces plus the ambient
//! configuration, logging and metrics plumbing.

/// Configuration and environment loading.
pub mod config;

/// Bulk file downloads from the S3-compatible store.
pub mod flatfiles;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// WebSocket streaming sessions.
pub mod polygon;

/// REST endpoint wrappers.
pub mod rest;

/// Tracing subscriber and OpenTelemetry integration.
pub mod telemetry;
