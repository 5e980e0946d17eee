#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Polygon Client - Market Data SDK
//!
//! Client library for the Polygon.io market data API: thin REST endpoint
//! wrappers, a long-lived WebSocket streaming session, and a downloader for
//! the bulk flat files.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Transport-free types
//!   - `channel`: `<event-type>.<symbol>` channel names
//!   - `streaming`: connection states, disconnect reasons, inbound events
//!   - `subscription`: the desired subscription set
//!
//! - **Application**: Port definitions
//!   - `ports`: the `StreamHandler` capability a session drives
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `polygon`: streaming session actor, auth, codec, reconnect policy
//!   - `rest`: REST client and per-market endpoint modules
//!   - `flatfiles`: object keys, SigV4 presigning, downloads
//!   - `config`, `metrics`, `telemetry`: ambient plumbing
//!
//! # Data Flow
//!
//! ```text
//!                      ┌───────────────┐  commands  ┌──────────────┐
//!  SessionHandle ─────►│ session actor │───────────►│  WebSocket   │
//!   (subscribe, …)     │  SessionCore  │◄───────────│  feed        │
//!                      └──────┬────────┘   frames   └──────────────┘
//!                             │ on_connect / on_message / on_disconnect
//!                             ▼
//!                       StreamHandler (caller state threaded through)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core streaming types with no transport dependencies.
pub mod domain;

/// Application layer - Port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::channel::{Channel, ChannelError, EventType, IntoChannels};
pub use domain::streaming::{
    AggregateEvent, ConnectionState, DisconnectReason, InboundEvent, MarketEvent, QuoteEvent,
    TradeEvent,
};
pub use domain::subscription::SubscriptionSet;

// Ports
pub use application::ports::{HandlerReply, StreamHandler};

// Infrastructure config
pub use infrastructure::config::{
    ApiKey, ClientConfig, ConfigError, FlatFileSettings, RestSettings, S3Credentials,
    StreamSettings,
};

// Streaming
pub use infrastructure::polygon::{
    ReconnectConfig, SessionBuilder, SessionError, SessionHandle, StreamSession,
};

// REST
pub use infrastructure::rest::{QueryOptions, RestClient, RestError};

// Flat files
pub use infrastructure::flatfiles::{
    AssetClass, DataType, FlatFileClient, FlatFileError, FlatFileKey, FlatFilePrefix,
};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
