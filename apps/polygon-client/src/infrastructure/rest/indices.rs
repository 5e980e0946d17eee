//! Indices endpoints. Tickers use the `I:` prefix.

use serde_json::Value;

pub use super::common::{aggregates, daily_open_close, previous_close};
use super::error::RestError;
use super::http_client::RestClient;
use super::query::{Endpoint, QueryOptions};

const SNAPSHOT: Endpoint = Endpoint::new(
    "/v3/snapshot/indices",
    &["ticker", "ticker.any_of", "ticker.gte", "ticker.lte", "order", "limit", "sort"],
);

/// Snapshot of indices, filtered by the `ticker.any_of` option.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn snapshot(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&SNAPSHOT, &[], options).await
}
