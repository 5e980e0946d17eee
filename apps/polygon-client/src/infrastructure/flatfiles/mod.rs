//! Flat Files
//!
//! Bulk daily files (trades, quotes, bars) served from an S3-compatible
//! store. Keys are built with [`FlatFileKey`] and fetched through
//! [`FlatFileClient`] using SigV4 presigned URLs.

mod client;
mod error;
mod key;
mod signer;

pub use client::FlatFileClient;
pub use error::FlatFileError;
pub use key::{AssetClass, DEFAULT_FORMAT, DataType, FlatFileKey, FlatFilePrefix};
pub use signer::{MAX_EXPIRY, Presigner};
