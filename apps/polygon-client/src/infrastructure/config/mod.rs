//! Configuration Module
//!
//! Explicit configuration for every client, with an environment loader.

mod settings;

pub use settings::{
    ApiKey, ClientConfig, ConfigError, DEFAULT_BASE_URL, DEFAULT_S3_BUCKET, DEFAULT_S3_ENDPOINT,
    DEFAULT_S3_REGION, DELAYED_STREAM_URL, FlatFileSettings, REALTIME_STREAM_URL, RestSettings,
    S3Credentials, StreamSettings, parse_env_bool,
};
