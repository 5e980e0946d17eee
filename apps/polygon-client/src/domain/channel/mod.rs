//! Channel Identifiers
//!
//! A channel names one event stream on the socket feed. The wire form is
//! `<event-type>.<symbol>`, for example `AM.AAPL` or `T.*`, where `*`
//! selects every symbol for that event type.
//!
//! Subscribe and unsubscribe calls take plain strings and forward them
//! verbatim; [`Channel`] is the typed helper for building and validating
//! identifiers on the caller side.

use std::fmt;
use std::str::FromStr;

/// Separator between the event type and the symbol.
pub const SEPARATOR: char = '.';

/// Symbol that selects all tickers for an event type.
pub const WILDCARD: &str = "*";

// =============================================================================
// Errors
// =============================================================================

/// Errors raised when parsing a channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The identifier has no `.` separator.
    #[error("channel '{0}' is missing the '.' separator")]
    MissingSeparator(String),

    /// The identifier has more than one `.` separator.
    #[error("channel '{0}' contains more than one '.' separator")]
    TooManySeparators(String),

    /// The event type part is empty.
    #[error("channel '{0}' has an empty event type")]
    EmptyEventType(String),

    /// The symbol part is empty.
    #[error("channel '{0}' has an empty symbol")]
    EmptySymbol(String),
}

// =============================================================================
// Event Type
// =============================================================================

/// Event type prefix of a channel (and the `ev` field of data frames).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Per-minute aggregate (`AM`).
    MinuteAggregate,
    /// Per-second aggregate (`A`).
    SecondAggregate,
    /// Trade (`T`).
    Trade,
    /// Quote (`Q`).
    Quote,
    /// Limit-up/limit-down band (`LULD`).
    LimitUpLimitDown,
    /// Order imbalance (`NOI`).
    Imbalance,
    /// Fair market value (`FMV`).
    FairMarketValue,
    /// Any other prefix, kept as sent.
    Other(String),
}

impl EventType {
    /// Map a wire code to an event type.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "AM" => Self::MinuteAggregate,
            "A" => Self::SecondAggregate,
            "T" => Self::Trade,
            "Q" => Self::Quote,
            "LULD" => Self::LimitUpLimitDown,
            "NOI" => Self::Imbalance,
            "FMV" => Self::FairMarketValue,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire code for this event type.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::MinuteAggregate => "AM",
            Self::SecondAggregate => "A",
            Self::Trade => "T",
            Self::Quote => "Q",
            Self::LimitUpLimitDown => "LULD",
            Self::Imbalance => "NOI",
            Self::FairMarketValue => "FMV",
            Self::Other(code) => code,
        }
    }

    /// Whether this event type carries aggregate (OHLCV) bars.
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        matches!(self, Self::MinuteAggregate | Self::SecondAggregate)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Channel
// =============================================================================

/// A validated `<event-type>.<symbol>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    event_type: EventType,
    symbol: String,
}

impl Channel {
    /// Create a channel for one symbol.
    #[must_use]
    pub fn new(event_type: EventType, symbol: impl Into<String>) -> Self {
        Self {
            event_type,
            symbol: symbol.into(),
        }
    }

    /// Create a wildcard channel covering every symbol.
    #[must_use]
    pub fn all(event_type: EventType) -> Self {
        Self::new(event_type, WILDCARD)
    }

    /// Parse a wire identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`] unless the input has exactly one separator
    /// with non-empty text on both sides.
    pub fn parse(raw: &str) -> Result<Self, ChannelError> {
        let mut parts = raw.split(SEPARATOR);
        let (Some(code), Some(symbol)) = (parts.next(), parts.next()) else {
            return Err(ChannelError::MissingSeparator(raw.to_string()));
        };
        if parts.next().is_some() {
            return Err(ChannelError::TooManySeparators(raw.to_string()));
        }
        if code.is_empty() {
            return Err(ChannelError::EmptyEventType(raw.to_string()));
        }
        if symbol.is_empty() {
            return Err(ChannelError::EmptySymbol(raw.to_string()));
        }
        Ok(Self::new(EventType::from_code(code), symbol))
    }

    /// The event type part.
    #[must_use]
    pub const fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// The symbol part (a ticker or `*`).
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether this channel covers every symbol.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.symbol == WILDCARD
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.event_type.code(), self.symbol)
    }
}

impl FromStr for Channel {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.to_string()
    }
}

impl From<&Channel> for String {
    fn from(channel: &Channel) -> Self {
        channel.to_string()
    }
}

// =============================================================================
// IntoChannels
// =============================================================================

/// Anything that can be passed to subscribe/unsubscribe: a single channel
/// or an ordered sequence of channels.
pub trait IntoChannels {
    /// Convert into wire channel strings, preserving order.
    fn into_channels(self) -> Vec<String>;
}

impl IntoChannels for &str {
    fn into_channels(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoChannels for String {
    fn into_channels(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoChannels for &String {
    fn into_channels(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoChannels for Channel {
    fn into_channels(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl<T: Into<String>> IntoChannels for Vec<T> {
    fn into_channels(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<String>, const N: usize> IntoChannels for [T; N] {
    fn into_channels(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T> IntoChannels for &[T]
where
    T: Clone + Into<String>,
{
    fn into_channels(self) -> Vec<String> {
        self.iter().cloned().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("AM", EventType::MinuteAggregate)]
    #[test_case("A", EventType::SecondAggregate)]
    #[test_case("T", EventType::Trade)]
    #[test_case("Q", EventType::Quote)]
    #[test_case("LULD", EventType::LimitUpLimitDown)]
    #[test_case("NOI", EventType::Imbalance)]
    #[test_case("FMV", EventType::FairMarketValue)]
    fn event_type_codes_round_trip(code: &str, expected: EventType) {
        let parsed = EventType::from_code(code);
        assert_eq!(parsed, expected);
        assert_eq!(parsed.code(), code);
    }

    #[test]
    fn unknown_event_type_is_preserved() {
        let parsed = EventType::from_code("XQ");
        assert_eq!(parsed, EventType::Other("XQ".to_string()));
        assert_eq!(parsed.code(), "XQ");
    }

    #[test]
    fn parse_concrete_channel() {
        let channel = Channel::parse("AM.AAPL").unwrap();
        assert_eq!(channel.event_type(), &EventType::MinuteAggregate);
        assert_eq!(channel.symbol(), "AAPL");
        assert!(!channel.is_wildcard());
        assert_eq!(channel.to_string(), "AM.AAPL");
    }

    #[test]
    fn parse_wildcard_channel() {
        let channel: Channel = "T.*".parse().unwrap();
        assert!(channel.is_wildcard());
        assert_eq!(channel, Channel::all(EventType::Trade));
    }

    #[test_case("AM" ; "no separator")]
    #[test_case("" ; "empty")]
    fn parse_rejects_missing_separator(raw: &str) {
        assert!(matches!(
            Channel::parse(raw),
            Err(ChannelError::MissingSeparator(_))
        ));
    }

    #[test]
    fn parse_rejects_extra_separator() {
        assert!(matches!(
            Channel::parse("A.B.C"),
            Err(ChannelError::TooManySeparators(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_parts() {
        assert!(matches!(
            Channel::parse(".AAPL"),
            Err(ChannelError::EmptyEventType(_))
        ));
        assert!(matches!(
            Channel::parse("T."),
            Err(ChannelError::EmptySymbol(_))
        ));
    }

    #[test]
    fn into_channels_single_and_sequence() {
        assert_eq!("AM.AAPL".into_channels(), vec!["AM.AAPL"]);
        assert_eq!(
            vec!["AM.AAPL", "T.MSFT"].into_channels(),
            vec!["AM.AAPL", "T.MSFT"]
        );
        assert_eq!(
            [Channel::all(EventType::Quote), Channel::new(EventType::Trade, "X")]
                .into_channels(),
            vec!["Q.*", "T.X"]
        );
        let owned = vec!["A.SPY".to_string()];
        assert_eq!(owned.as_slice().into_channels(), vec!["A.SPY"]);
    }
}
