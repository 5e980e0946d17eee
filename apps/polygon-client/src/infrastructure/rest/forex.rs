//! Forex endpoints. Pair tickers use the `C:` prefix (e.g. `C:EURUSD`).

use serde_json::Value;

pub use super::common::{aggregates, previous_close, quotes};
use super::error::RestError;
use super::http_client::RestClient;
use super::query::{Endpoint, QueryOptions};

const LAST_QUOTE: Endpoint = Endpoint::new("/v1/last_quote/currencies/{from}/{to}", &[]);
const CONVERSION: Endpoint = Endpoint::new("/v1/conversion/{from}/{to}", &["amount", "precision"]);
const SNAPSHOT: Endpoint = Endpoint::new("/v2/snapshot/locale/global/markets/forex/tickers", &["tickers"]);

/// Daily bars for every currency pair on `date`.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn grouped_daily(
    client: &RestClient,
    date: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    super::common::grouped_daily(client, "global", "fx", date, options).await
}

/// Last quote for a currency pair, e.g. `("EUR", "USD")`.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn last_quote(
    client: &RestClient,
    from: &str,
    to: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&LAST_QUOTE, &[("from", from), ("to", to)], options).await
}

/// Convert an amount (the `amount` option) between currencies.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn conversion(
    client: &RestClient,
    from: &str,
    to: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&CONVERSION, &[("from", from), ("to", to)], options).await
}

/// Snapshot of every currency pair.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn snapshot(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&SNAPSHOT, &[], options).await
}
