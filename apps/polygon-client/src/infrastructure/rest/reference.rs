//! Reference data endpoints.

use serde_json::Value;

use super::error::RestError;
use super::http_client::RestClient;
use super::query::{Endpoint, QueryOptions};

const TICKERS: Endpoint = Endpoint::new(
    "/v3/reference/tickers",
    &[
        "ticker",
        "ticker.gte",
        "ticker.gt",
        "ticker.lte",
        "ticker.lt",
        "type",
        "market",
        "exchange",
        "cusip",
        "cik",
        "date",
        "search",
        "active",
        "order",
        "limit",
        "sort",
    ],
);
const TICKER_DETAILS: Endpoint = Endpoint::new("/v3/reference/tickers/{ticker}", &["date"]);
const TICKER_TYPES: Endpoint = Endpoint::new("/v3/reference/tickers/types", &["asset_class", "locale"]);
const NEWS: Endpoint = Endpoint::new(
    "/v2/reference/news",
    &[
        "ticker",
        "published_utc",
        "published_utc.gte",
        "published_utc.gt",
        "published_utc.lte",
        "published_utc.lt",
        "order",
        "limit",
        "sort",
    ],
);
const EXCHANGES: Endpoint = Endpoint::new("/v3/reference/exchanges", &["asset_class", "locale"]);
const CONDITIONS: Endpoint = Endpoint::new(
    "/v3/reference/conditions",
    &["asset_class", "data_type", "id", "sip", "order", "limit", "sort"],
);
const DIVIDENDS: Endpoint = Endpoint::new(
    "/v3/reference/dividends",
    &[
        "ticker",
        "ex_dividend_date",
        "ex_dividend_date.gte",
        "ex_dividend_date.lte",
        "record_date",
        "declaration_date",
        "pay_date",
        "frequency",
        "cash_amount",
        "dividend_type",
        "order",
        "limit",
        "sort",
    ],
);
const SPLITS: Endpoint = Endpoint::new(
    "/v3/reference/splits",
    &[
        "ticker",
        "execution_date",
        "execution_date.gte",
        "execution_date.lte",
        "reverse_split",
        "order",
        "limit",
        "sort",
    ],
);
const MARKET_STATUS: Endpoint = Endpoint::new("/v1/marketstatus/now", &[]);
const MARKET_HOLIDAYS: Endpoint = Endpoint::new("/v1/marketstatus/upcoming", &[]);

/// Search tickers.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn tickers(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&TICKERS, &[], options).await
}

/// Details for one ticker, optionally as of the `date` option.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn ticker_details(
    client: &RestClient,
    ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&TICKER_DETAILS, &[("ticker", ticker)], options).await
}

/// Ticker type codes.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn ticker_types(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&TICKER_TYPES, &[], options).await
}

/// News articles.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn news(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&NEWS, &[], options).await
}

/// Exchanges.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn exchanges(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&EXCHANGES, &[], options).await
}

/// Trade and quote condition codes.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn conditions(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&CONDITIONS, &[], options).await
}

/// Cash dividends.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn dividends(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&DIVIDENDS, &[], options).await
}

/// Stock splits.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn splits(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&SPLITS, &[], options).await
}

/// Current market status.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn market_status(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&MARKET_STATUS, &[], options).await
}

/// Upcoming market holidays.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn market_holidays(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&MARKET_HOLIDAYS, &[], options).await
}
