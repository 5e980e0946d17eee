//! Economic data endpoints.

use serde_json::Value;

use super::error::RestError;
use super::http_client::RestClient;
use super::query::{Endpoint, QueryOptions};

const DATE_PARAMS: &[&str] = &["date", "date.gte", "date.gt", "date.lte", "date.lt", "order", "limit", "sort"];

const TREASURY_YIELDS: Endpoint = Endpoint::new("/fed/v1/treasury-yields", DATE_PARAMS);
const INFLATION: Endpoint = Endpoint::new("/fed/v1/inflation", DATE_PARAMS);
const INFLATION_EXPECTATIONS: Endpoint = Endpoint::new("/fed/v1/inflation-expectations", DATE_PARAMS);

/// US treasury yields.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn treasury_yields(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&TREASURY_YIELDS, &[], options).await
}

/// Realized inflation.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn inflation(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&INFLATION, &[], options).await
}

/// Market inflation expectations.
///
/// # Errors
///
/// Returns `RestError` on transport failure or a non-success response.
pub async fn inflation_expectations(client: &RestClient, options: &QueryOptions) -> Result<Value, RestError> {
    client.get(&INFLATION_EXPECTATIONS, &[], options).await
}
