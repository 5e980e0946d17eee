//! Options endpoints.
//!
//! Contract tickers use the `O:` prefix (e.g. `O:SPY251219C00650000`).

use serde_json::Value;

pub use super::common::{aggregates, daily_open_close, last_trade, previous_close, quotes, trades};
use super::error::RestError;
use super::http_client::RestClient;
use super::query::{Endpoint, QueryOptions};

const CONTRACTS: Endpoint = Endpoint::new(
    "/v3/reference/options/contracts",
    &[
        "underlying_ticker",
        "contract_type",
        "expiration_date",
        "expiration_date.gte",
        "expiration_date.lte",
        "as_of",
        "strike_price",
        "strike_price.gte",
        "strike_price.lte",
        "expired",
        "order",
        "limit",
        "sort",
    ],
);
const CONTRACT_DETAILS: Endpoint =
    Endpoint::new("/v3/reference/options/contracts/{options_ticker}", &["as_of"]);
const CHAIN_SNAPSHOT: Endpoint = Endpoint::new(
    "/v3/snapshot/options/{underlying}",
    &[
        "strike_price",
        "strike_price.gte",
        "strike_price.lte",
        "expiration_date",
        "expiration_date.gte",
        "expiration_date.lte",
        "contract_type",
        "order",
        "limit",
        "sort",
    ],
);
const CONTRACT_SNAPSHOT: Endpoint =
    Endpoint::new("/v3/snapshot/options/{underlying}/{options_ticker}", &[]);

/// List option contracts.
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
    options_ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client
        .get(&CONTRACT_DETAILS, &[("options_ticker", options_ticker)], options)
        .await
}

/// Snapshot of every contract on an underlying.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn chain_snapshot(
    client: &RestClient,
    underlying: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&CHAIN_SNAPSHOT, &[("underlying", underlying)], options).await
}

/// Snapshot of one contract.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn contract_snapshot(
    client: &RestClient,
    underlying: &str,
    options_ticker: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client
        .get(
            &CONTRACT_SNAPSHOT,
            &[("underlying", underlying), ("options_ticker", options_ticker)],
            options,
        )
        .await
}
