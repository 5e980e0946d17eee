//! Futures endpoints (experimental `vX` API).

use serde_json::Value;

use super::error::RestError;
use super::http_client::RestClient;
use super::query::{Endpoint, QueryOptions};

const AGGREGATES: Endpoint = Endpoint::new(
    "/futures/vX/aggs/{ticker}",
    &[
        "resolution",
        "window_start",
        "window_start.gte",
        "window_start.gt",
        "window_start.lte",
        "window_start.lt",
        "order",
        "limit",
        "sort",
    ],
);
const CONTRACTS: Endpoint = Endpoint::new(
    "/futures/vX/contracts",
    &["product_code", "first_trade_date", "last_trade_date", "as_of", "active", "type", "order", "limit", "sort"],
);
const CONTRACT_DETAILS: Endpoint = Endpoint::new("/futures/vX/contracts/{ticker}", &["as_of"]);
const PRODUCTS: Endpoint = Endpoint::new(
    "/futures/vX/products",
    &["name", "as_of", "trading_venue", "sector", "sub_sector", "asset_class", "asset_sub_class", "type", "order", "limit", "sort"],
);
const PRODUCT_DETAILS: Endpoint =
    Endpoint::new("/futures/vX/products/{product_code}", &["as_of", "type"]);
const SCHEDULES: Endpoint = Endpoint::new(
    "/futures/vX/schedules",
    &["product_code", "session_end_date", "trading_venue", "order", "limit", "sort"],
);

/// Bars for one contract at the `resolution` option's granularity.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn aggregates(client: &RestClient, ticker: &str, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&AGGREGATES, &[("ticker", ticker)], options).await
}

/// List contracts.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn contracts(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&CONTRACTS, &[], options).await
}

/// Details for one contract.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn contract_details(
    client: &RestClient,
    ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&CONTRACT_DETAILS, &[("ticker", ticker)], options).await
}

/// List products.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn products(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&PRODUCTS, &[], options).await
}

/// Details for one product.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn product_details(
    client: &RestClient,
    product_code: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&PRODUCT_DETAILS, &[("product_code", product_code)], options).await
}

/// Trading session schedules.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn schedules(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&SCHEDULES, &[], options).await
}
