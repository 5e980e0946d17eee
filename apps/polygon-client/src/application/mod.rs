//! Application Layer - Port definitions.
//!
//! This layer holds the interfaces the streaming session drives. Callers
//! implement them; infrastructure adapters invoke them.

/// Port interfaces implemented by callers (stream handlers).
pub mod ports;
