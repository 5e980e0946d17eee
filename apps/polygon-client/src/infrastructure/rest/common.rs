//! Endpoints Shared Across Markets
//!
//! Aggregates, previous close, daily open/close, tick history and last
//! trade use the same paths for every asset class that supports them; the
//! per-market modules re-export what applies to them.

use serde_json::Value;

use super::error::RestError;
use super::http_client::RestClient;
use super::query::{Endpoint, QueryOptions, Timespan};

// =============================================================================
// Query Key Allow-Lists
// =============================================================================

/// Keys accepted by the aggregate bars endpoint.
pub const AGGREGATE_PARAMS: &[&str] = &["adjusted", "sort", "limit"];

/// Keys accepted by grouped daily bars.
pub const GROUPED_PARAMS: &[&str] = &["adjusted", "include_otc"];

/// Keys accepted by tick history (trades and quotes).
pub const TICK_PARAMS: &[&str] = &[
    "timestamp",
    "timestamp.gte",
    "timestamp.gt",
    "timestamp.lte",
    "timestamp.lt",
    "order",
    "limit",
    "sort",
];

/// Keys accepted by the moving-average indicators.
pub const INDICATOR_PARAMS: &[&str] = &[
    "timestamp",
    "timestamp.gte",
    "timestamp.gt",
    "timestamp.lte",
    "timestamp.lt",
    "timespan",
    "adjusted",
    "window",
    "series_type",
    "expand_underlying",
    "order",
    "limit",
];

/// Keys accepted by MACD.
pub const MACD_PARAMS: &[&str] = &[
    "timestamp",
    "timestamp.gte",
    "timestamp.gt",
    "timestamp.lte",
    "timestamp.lt",
    "timespan",
    "adjusted",
    "short_window",
    "long_window",
    "signal_window",
    "series_type",
    "expand_underlying",
    "order",
    "limit",
];

// =============================================================================
// Endpoints
// =============================================================================

const AGGREGATES: Endpoint = Endpoint::new(
    "/v2/aggs/ticker/{ticker}/range/{multiplier}/{timespan}/{from}/{to}",
    AGGREGATE_PARAMS,
);
const PREVIOUS_CLOSE: Endpoint = Endpoint::new("/v2/aggs/ticker/{ticker}/prev", &["adjusted"]);
const DAILY_OPEN_CLOSE: Endpoint = Endpoint::new("/v1/open-close/{ticker}/{date}", &["adjusted"]);
const TRADES: Endpoint = Endpoint::new("/v3/trades/{ticker}", TICK_PARAMS);
const QUOTES: Endpoint = Endpoint::new("/v3/quotes/{ticker}", TICK_PARAMS);
const LAST_TRADE: Endpoint = Endpoint::new("/v2/last/trade/{ticker}", &[]);

/// Aggregate bars over a date range.
///
/// `from` and `to` are `YYYY-MM-DD` dates or millisecond timestamps.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn aggregates(
    client: &RestClient,
    ticker: &str,
    multiplier: u32,
    timespan: Timespan,
    from: &str,
    to: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    let multiplier = multiplier.to_string();
    client
        .get(
            &AGGREGATES,
            &[
                ("ticker", ticker),
                ("multiplier", &multiplier),
                ("timespan", timespan.as_str()),
                ("from", from),
                ("to", to),
            ],
            options,
        )
        .await
}

/// Previous trading day's bar.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn previous_close(
    client: &RestClient,
    ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&PREVIOUS_CLOSE, &[("ticker", ticker)], options).await
}

/// Open, close and extended-hours prices for one day.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn daily_open_close(
    client: &RestClient,
    ticker: &str,
    date: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client
        .get(&DAILY_OPEN_CLOSE, &[("ticker", ticker), ("date", date)], options)
        .await
}

/// Tick-level trades.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn trades(
    client: &RestClient,
    ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&TRADES, &[("ticker", ticker)], options).await
}

/// Tick-level quotes.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn quotes(
    client: &RestClient,
    ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&QUOTES, &[("ticker", ticker)], options).await
}

/// Most recent trade.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn last_trade(
    client: &RestClient,
    ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&LAST_TRADE, &[("ticker", ticker)], options).await
}

/// Grouped daily bars for a whole market on one date.
pub(super) async fn grouped_daily(
    client: &RestClient,
    locale: &str,
    market: &str,
    date: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    const GROUPED: Endpoint = Endpoint::new(
        "/v2/aggs/grouped/locale/{locale}/market/{market}/{date}",
        GROUPED_PARAMS,
    );
    client
        .get(
            &GROUPED,
            &[("locale", locale), ("market", market), ("date", date)],
            options,
        )
        .await
}
