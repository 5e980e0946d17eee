//! HTTP client bound to the REST base URL and bearer token.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::RestError;
use super::query::{Endpoint, QueryOptions};
use crate::infrastructure::config::{ApiKey, ClientConfig, ConfigError, RestSettings};

/// Vendor error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Authenticated HTTP client for the REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// Create a client for `settings.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the key cannot
    /// be carried in a header.
    pub fn new(api_key: &ApiKey, settings: &RestSettings) -> Result<Self, RestError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| RestError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key.expose()))
            .map_err(|_| ConfigError::InvalidValue {
                key: "api key".to_string(),
                value: "[REDACTED]".to_string(),
            })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Create a client from full client configuration.
    ///
    /// # Errors
    ///
    /// See [`RestClient::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, RestError> {
        Self::new(&config.api_key, &config.rest)
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for an endpoint call.
    ///
    /// # Errors
    ///
    /// Returns an error if a path segment is missing or the result does not
    /// parse as a URL.
    pub fn url(
        &self,
        endpoint: &Endpoint,
        segments: &[(&str, &str)],
        options: &QueryOptions,
    ) -> Result<Url, RestError> {
        let path = endpoint.render_path(segments)?;
        let raw = format!("{}{path}", self.base_url);
        let mut url = Url::parse(&raw).map_err(|e| RestError::InvalidUrl(format!("{raw}: {e}")))?;

        let pairs = endpoint.filter(options);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Issue one GET and return the JSON body unprocessed.
    ///
    /// # Errors
    ///
    /// Returns `RestError::Http` on transport failure, `RestError::Api` on
    /// a non-success status and `RestError::Decode` if the body is not JSON.
    pub async fn get(
        &self,
        endpoint: &Endpoint,
        segments: &[(&str, &str)],
        options: &QueryOptions,
    ) -> Result<Value, RestError> {
        let url = self.url(endpoint, segments, options)?;
        tracing::debug!(path = %url.path(), query = url.query().unwrap_or_default(), "GET");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.or(b.message))
                .unwrap_or(body);
            tracing::debug!(status = status.as_u16(), message = %message, "API error");
            return Err(RestError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Issue one GET and decode the body into `T`.
    ///
    /// # Errors
    ///
    /// As [`RestClient::get`], plus `RestError::Decode` if the JSON does not
    /// match `T`.
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        segments: &[(&str, &str)],
        options: &QueryOptions,
    ) -> Result<T, RestError> {
        let value = self.get(endpoint, segments, options).await?;
        Ok(T::deserialize(value)?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base_url: &str) -> RestClient {
        let settings = RestSettings {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
        };
        RestClient::new(&ApiKey::new("key").unwrap(), &settings).unwrap()
    }

    const DETAILS: Endpoint = Endpoint::new("/v3/reference/tickers/{ticker}", &["date"]);

    #[test]
    fn url_without_options_has_no_query() {
        let url = client("https://api.polygon.io/")
            .url(&DETAILS, &[("ticker", "AAPL")], &QueryOptions::new())
            .unwrap();
        assert_eq!(url.as_str(), "https://api.polygon.io/v3/reference/tickers/AAPL");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn url_with_filtered_options() {
        let options = QueryOptions::new().with("date", "2023-01-01").with("limit", 5);
        let url = client("https://api.polygon.io")
            .url(&DETAILS, &[("ticker", "AAPL")], &options)
            .unwrap();
        assert_eq!(url.query(), Some("date=2023-01-01"));
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let url = client("http://localhost:8080/proxy")
            .url(&DETAILS, &[("ticker", "MSFT")], &QueryOptions::new())
            .unwrap();
        assert_eq!(url.path(), "/proxy/v3/reference/tickers/MSFT");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let settings = RestSettings {
            base_url: "not a url".to_string(),
            ..RestSettings::default()
        };
        assert!(matches!(
            RestClient::new(&ApiKey::new("key").unwrap(), &settings),
            Err(RestError::InvalidUrl(_))
        ));
    }
}
