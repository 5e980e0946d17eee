//! Stocks endpoints.

use serde_json::Value;

pub use super::common::{
    aggregates, daily_open_close, last_trade, previous_close, quotes, trades,
};
use super::common::{INDICATOR_PARAMS, MACD_PARAMS};
use super::error::RestError;
use super::http_client::RestClient;
use super::query::{Direction, Endpoint, QueryOptions};

const LAST_QUOTE: Endpoint = Endpoint::new("/v2/last/nbbo/{ticker}", &[]);
const SNAPSHOT_ALL: Endpoint = Endpoint::new(
    "/v2/snapshot/locale/us/markets/stocks/tickers",
    &["tickers", "include_otc"],
);
const SNAPSHOT_TICKER: Endpoint =
    Endpoint::new("/v2/snapshot/locale/us/markets/stocks/tickers/{ticker}", &[]);
const SNAPSHOT_DIRECTION: Endpoint = Endpoint::new(
    "/v2/snapshot/locale/us/markets/stocks/{direction}",
    &["include_otc"],
);
const SMA: Endpoint = Endpoint::new("/v1/indicators/sma/{ticker}", INDICATOR_PARAMS);
const EMA: Endpoint = Endpoint::new("/v1/indicators/ema/{ticker}", INDICATOR_PARAMS);
const RSI: Endpoint = Endpoint::new("/v1/indicators/rsi/{ticker}", INDICATOR_PARAMS);
const MACD: Endpoint = Endpoint::new("/v1/indicators/macd/{ticker}", MACD_PARAMS);

/// Daily bars for every US stock on `date`.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn grouped_daily(
    client: &RestClient,
    date: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    super::common::grouped_daily(client, "us", "stocks", date, options).await
}

/// Most recent NBBO quote.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn last_quote(
    client: &RestClient,
    ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&LAST_QUOTE, &[("ticker", ticker)], options).await
}

/// Snapshot of every ticker, or those named in the `tickers` option.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn snapshot_all(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&SNAPSHOT_ALL, &[], options).await
}

/// Snapshot of one ticker.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn snapshot_ticker(
    client: &RestClient,
    ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&SNAPSHOT_TICKER, &[("ticker", ticker)], options).await
}

/// Top gainers or losers of the day.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn snapshot_direction(
    client: &RestClient,
    direction: Direction,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client
        .get(&SNAPSHOT_DIRECTION, &[("direction", direction.as_str())], options)
        .await
}

/// Simple moving average.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn sma(client: &RestClient, ticker: &str, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&SMA, &[("ticker", ticker)], options).await
}

/// Exponential moving average.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn ema(client: &RestClient, ticker: &str, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&EMA, &[("ticker", ticker)], options).await
}

/// Moving average convergence/divergence.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn macd(client: &RestClient, ticker: &str, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&MACD, &[("ticker", ticker)], options).await
}

/// Relative strength index.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn rsi(client: &RestClient, ticker: &str, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&RSI, &[("ticker", ticker)], options).await
}
