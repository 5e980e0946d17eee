//! Market Data Streaming Types
//!
//! Inbound socket frames are classified into [`InboundEvent`]s by their
//! `ev`/`status` discriminator fields:
//!
//! ```json
//! {"ev":"status","status":"connected","message":"Connected Successfully"}
//! {"ev":"status","status":"auth_success","message":"authenticated"}
//! {"ev":"status","status":"auth_failed","message":"authentication failed"}
//! {"ev":"T","sym":"AAPL","p":150.0,"s":10,"t":1672531200000}
//! ```
//!
//! Anything that is not a status object is market data and is handed to
//! the caller verbatim as a [`MarketEvent`]. Typed views (trade, quote,
//! aggregate) decode on demand.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::channel::EventType;

/// Discriminator value carried by status frames.
pub const STATUS_EVENT: &str = "status";

/// Status reported once the transport is up.
pub const STATUS_CONNECTED: &str = "connected";

/// Status reported after a successful `auth` command.
pub const STATUS_AUTH_SUCCESS: &str = "auth_success";

// =============================================================================
// Connection State
// =============================================================================

/// Lifecycle of a streaming session's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport.
    #[default]
    Disconnected,
    /// Transport connect in progress.
    Connecting,
    /// Transport up, `auth` command sent, no reply yet.
    ConnectedUnauthenticated,
    /// Server confirmed the credential.
    Authenticated,
}

impl ConnectionState {
    /// Check if currently authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Check if a transport is open (authenticated or not).
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::ConnectedUnauthenticated | Self::Authenticated)
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::ConnectedUnauthenticated => "connected_unauthenticated",
            Self::Authenticated => "authenticated",
        }
    }
}

/// Why a session's transport went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The stream ended without a close frame or with an empty one.
    Closed,
    /// The server sent a close frame with a code and reason.
    Remote {
        /// WebSocket close code.
        code: u16,
        /// Close reason text.
        reason: String,
    },
    /// The transport failed mid-session.
    Transport(String),
    /// The transport could not be opened.
    ConnectFailed(String),
    /// The caller closed the session.
    Shutdown,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::Remote { code, reason } => write!(f, "closed by server ({code}): {reason}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::ConnectFailed(msg) => write!(f, "connect failed: {msg}"),
            Self::Shutdown => f.write_str("shutdown"),
        }
    }
}

// =============================================================================
// Inbound Events
// =============================================================================

/// A decoded inbound frame element.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Connection acknowledgement; informational only.
    ConnectionStatus {
        /// Server message, if any.
        message: Option<String>,
    },
    /// The credential was accepted.
    AuthSuccess {
        /// Server message, if any.
        message: Option<String>,
    },
    /// Any other status (e.g. `auth_failed`).
    Status {
        /// Status value.
        status: String,
        /// Server message, if any.
        message: Option<String>,
    },
    /// Market data payload.
    MarketData(MarketEvent),
}

impl InboundEvent {
    /// Classify one decoded JSON object.
    #[must_use]
    pub fn classify(fields: Map<String, Value>) -> Self {
        let status = match (
            fields.get("ev").and_then(Value::as_str),
            fields.get("status").and_then(Value::as_str),
        ) {
            (Some(STATUS_EVENT), Some(status)) => Some(status.to_string()),
            _ => None,
        };
        let Some(status) = status else {
            return Self::MarketData(MarketEvent::new(fields));
        };

        let message = fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        match status.as_str() {
            STATUS_CONNECTED => Self::ConnectionStatus { message },
            STATUS_AUTH_SUCCESS => Self::AuthSuccess { message },
            _ => Self::Status { status, message },
        }
    }

    /// Short name used for logs and metrics labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionStatus { .. } => "connection_status",
            Self::AuthSuccess { .. } => "auth_success",
            Self::Status { .. } => "status",
            Self::MarketData(_) => "market_data",
        }
    }
}

// =============================================================================
// Market Events
// =============================================================================

/// A market data payload as received: a generic key-value map.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEvent {
    fields: Map<String, Value>,
}

impl MarketEvent {
    /// Wrap a decoded JSON object.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// All fields, verbatim.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Take ownership of the fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Look up a single field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `ev` discriminator, if present.
    #[must_use]
    pub fn event_type(&self) -> Option<EventType> {
        self.fields
            .get("ev")
            .and_then(Value::as_str)
            .map(EventType::from_code)
    }

    /// The ticker (`sym`) or currency pair (`pair`), if present.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.fields
            .get("sym")
            .or_else(|| self.fields.get("pair"))
            .and_then(Value::as_str)
    }

    /// Decode as a trade.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload lacks the trade fields.
    pub fn as_trade(&self) -> Result<TradeEvent, serde_json::Error> {
        self.decode()
    }

    /// Decode as a quote.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload lacks the quote fields.
    pub fn as_quote(&self) -> Result<QuoteEvent, serde_json::Error> {
        self.decode()
    }

    /// Decode as an aggregate bar.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload lacks the aggregate fields.
    pub fn as_aggregate(&self) -> Result<AggregateEvent, serde_json::Error> {
        self.decode()
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(Value::Object(self.fields.clone()))
    }
}

/// Trade payload (`ev: "T"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TradeEvent {
    /// Ticker symbol.
    #[serde(rename = "sym")]
    pub symbol: String,
    /// Exchange ID.
    #[serde(rename = "x", default)]
    pub exchange: Option<i64>,
    /// Trade ID.
    #[serde(rename = "i", default)]
    pub trade_id: Option<String>,
    /// Tape (1 = NYSE, 2 = AMEX, 3 = Nasdaq).
    #[serde(rename = "z", default)]
    pub tape: Option<i64>,
    /// Trade price.
    #[serde(rename = "p")]
    pub price: Decimal,
    /// Trade size.
    #[serde(rename = "s")]
    pub size: Decimal,
    /// Trade conditions.
    #[serde(rename = "c", default)]
    pub conditions: Vec<i64>,
    /// SIP timestamp.
    #[serde(rename = "t", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Sequence number.
    #[serde(rename = "q", default)]
    pub sequence: Option<i64>,
}

/// Quote payload (`ev: "Q"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuoteEvent {
    /// Ticker symbol.
    #[serde(rename = "sym")]
    pub symbol: String,
    /// Bid exchange ID.
    #[serde(rename = "bx", default)]
    pub bid_exchange: Option<i64>,
    /// Bid price.
    #[serde(rename = "bp")]
    pub bid_price: Decimal,
    /// Bid size.
    #[serde(rename = "bs")]
    pub bid_size: Decimal,
    /// Ask exchange ID.
    #[serde(rename = "ax", default)]
    pub ask_exchange: Option<i64>,
    /// Ask price.
    #[serde(rename = "ap")]
    pub ask_price: Decimal,
    /// Ask size.
    #[serde(rename = "as")]
    pub ask_size: Decimal,
    /// Quote condition.
    #[serde(rename = "c", default)]
    pub condition: Option<i64>,
    /// SIP timestamp.
    #[serde(rename = "t", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Aggregate bar payload (`ev: "AM"` or `ev: "A"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggregateEvent {
    /// Ticker symbol.
    #[serde(rename = "sym")]
    pub symbol: String,
    /// Bar volume.
    #[serde(rename = "v")]
    pub volume: Decimal,
    /// Accumulated volume for the day.
    #[serde(rename = "av", default)]
    pub accumulated_volume: Option<Decimal>,
    /// Official opening price of the day.
    #[serde(rename = "op", default)]
    pub official_open: Option<Decimal>,
    /// Volume-weighted average price for the bar.
    #[serde(rename = "vw", default)]
    pub vwap: Option<Decimal>,
    /// Open.
    #[serde(rename = "o")]
    pub open: Decimal,
    /// Close.
    #[serde(rename = "c")]
    pub close: Decimal,
    /// High.
    #[serde(rename = "h")]
    pub high: Decimal,
    /// Low.
    #[serde(rename = "l")]
    pub low: Decimal,
    /// Bar start.
    #[serde(rename = "s", with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    /// Bar end.
    #[serde(rename = "e", with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
}
