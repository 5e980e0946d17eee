//! Domain Layer - Core streaming types and business logic.
//!
//! This layer contains the core domain types for market data streaming
//! with no transport dependencies. All types here are pure Rust with
//! serialization support.

/// Channel identifiers (`<event-type>.<symbol>`).
pub mod channel;

/// Inbound event classification and connection lifecycle types.
pub mod streaming;

/// Desired subscription tracking.
pub mod subscription;
