//! Crypto endpoints. Pair tickers use the `X:` prefix (e.g. `X:BTCUSD`).

use serde_json::Value;

pub use super::common::{aggregates, previous_close, trades};
use super::error::RestError;
use super::http_client::RestClient;
use super::query::{Endpoint, QueryOptions};

const DAILY_OPEN_CLOSE: Endpoint =
    Endpoint::new("/v1/open-close/crypto/{from}/{to}/{date}", &["adjusted"]);
const LAST_TRADE: Endpoint = Endpoint::new("/v1/last/crypto/{from}/{to}", &[]);
const SNAPSHOT: Endpoint = Endpoint::new("/v2/snapshot/locale/global/markets/crypto/tickers", &["tickers"]);

/// Daily bars for every crypto pair on `date`.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn grouped_daily(
    client: &RestClient,
    date: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    super::common::grouped_daily(client, "global", "crypto", date, options).await
}

/// Open and close for a pair, e.g. `("BTC", "USD")`, on one day.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn daily_open_close(
    client: &RestClient,
    from: &str,
    to: &str,
    date: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client
        .get(&DAILY_OPEN_CLOSE, &[("from", from), ("to", to), ("date", date)], options)
        .await
}

/// Last trade for a pair.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn last_trade(
    client: &RestClient,
    from: &str,
    to: &str,
    options: &QueryOptions,
) -> Result<Value, RestError> {
    client.get(&LAST_TRADE, &[("from", from), ("to", to)], options).await
}

/// Snapshot of every crypto pair.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn snapshot(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&SNAPSHOT, &[], options).await
}
