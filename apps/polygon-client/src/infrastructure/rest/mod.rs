//! REST Endpoint Modules
//!
//! Thin wrappers over the REST API. Each call issues exactly one GET through
//! [`RestClient`] and returns the JSON body unprocessed. Pagination cursors,
//! limits and filters are passed through as [`QueryOptions`]; keys an
//! endpoint does not accept are dropped before the request is built.
//!
//! ```rust,ignore
//! let client = RestClient::from_config(&config)?;
//! let details = reference::ticker_details(&client, "AAPL", &QueryOptions::new()).await?;
//! ```

mod common;
mod error;
mod http_client;
mod query;

pub mod crypto;
pub mod economy;
pub mod forex;
pub mod futures;
pub mod indices;
pub mod options;
pub mod reference;
pub mod stocks;

pub use error::RestError;
pub use http_client::RestClient;
pub use query::{Direction, Endpoint, QueryOptions, Timespan};
