//! Client Configuration Settings
//!
//! Configuration types for the REST, streaming and flat-file clients,
//! loaded from environment variables. Nothing here is read lazily: every
//! client and session takes its settings explicitly at construction.

use std::time::Duration;

/// Default REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";

/// Realtime stocks socket.
pub const REALTIME_STREAM_URL: &str = "wss://socket.polygon.io/stocks";

/// 15-minute delayed stocks socket.
pub const DELAYED_STREAM_URL: &str = "wss://delayed.polygon.io/stocks";

/// Default flat-file object store endpoint.
pub const DEFAULT_S3_ENDPOINT: &str = "https://files.polygon.io";

/// Default flat-file bucket.
pub const DEFAULT_S3_BUCKET: &str = "flatfiles";

/// Default flat-file signing region.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

// =============================================================================
// Credentials
// =============================================================================

/// API key used for REST bearer auth and the socket `auth` command.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyValue` if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyValue("api key".to_string()));
        }
        Ok(Self(key))
    }

    /// The raw key, for building requests.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

/// Object store access key pair for flat files.
#[derive(Clone)]
pub struct S3Credentials {
    access_key: String,
    secret_key: String,
}

impl S3Credentials {
    /// Create a key pair.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyValue` if either half is empty.
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();

        if access_key.is_empty() {
            return Err(ConfigError::EmptyValue("s3 access key".to_string()));
        }
        if secret_key.is_empty() {
            return Err(ConfigError::EmptyValue("s3 secret key".to_string()));
        }

        Ok(Self {
            access_key,
            secret_key,
        })
    }

    /// The access key ID.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// The secret access key.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Settings
// =============================================================================

/// REST client settings.
#[derive(Debug, Clone)]
pub struct RestSettings {
    /// Base URL every endpoint path is joined onto.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Streaming session settings.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Use the delayed feed instead of realtime.
    pub delayed: bool,
    /// Explicit socket URL; wins over `delayed`.
    pub url: Option<String>,
    /// Initial reconnection delay.
    pub reconnect_delay_initial: Duration,
    /// Maximum reconnection delay.
    pub reconnect_delay_max: Duration,
    /// Reconnection delay multiplier for exponential backoff.
    pub reconnect_delay_multiplier: f64,
    /// Maximum reconnection attempts before giving up (0 = unlimited).
    pub max_reconnect_attempts: u32,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            delayed: false,
            url: None,
            reconnect_delay_initial: Duration::from_secs(1),
            reconnect_delay_max: Duration::from_secs(64),
            reconnect_delay_multiplier: 2.0,
            max_reconnect_attempts: 0,
        }
    }
}

impl StreamSettings {
    /// The socket URL these settings select.
    #[must_use]
    pub fn stream_url(&self) -> &str {
        match (&self.url, self.delayed) {
            (Some(url), _) => url,
            (None, true) => DELAYED_STREAM_URL,
            (None, false) => REALTIME_STREAM_URL,
        }
    }
}

/// Flat-file object store settings.
#[derive(Debug, Clone)]
pub struct FlatFileSettings {
    /// Access key pair.
    pub credentials: S3Credentials,
    /// Endpoint URL, without the bucket.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Signing region.
    pub region: String,
}

impl FlatFileSettings {
    /// Settings for the default endpoint, bucket and region.
    #[must_use]
    pub fn new(credentials: S3Credentials) -> Self {
        Self {
            credentials,
            endpoint: DEFAULT_S3_ENDPOINT.to_string(),
            bucket: DEFAULT_S3_BUCKET.to_string(),
            region: DEFAULT_S3_REGION.to_string(),
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key.
    pub api_key: ApiKey,
    /// REST settings.
    pub rest: RestSettings,
    /// Streaming settings.
    pub stream: StreamSettings,
    /// Flat-file settings; `None` when no object store keys are configured.
    pub flat_files: Option<FlatFileSettings>,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            rest: RestSettings::default(),
            stream: StreamSettings::default(),
            flat_files: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `POLYGON_API_KEY` is missing or empty, if only
    /// one half of the object store key pair is set, or if a boolean
    /// variable holds something other than `true`/`false`/`1`/`0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("POLYGON_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("POLYGON_API_KEY".to_string()))?;
        if api_key.is_empty() {
            return Err(ConfigError::EmptyValue("POLYGON_API_KEY".to_string()));
        }

        let rest = RestSettings {
            base_url: std::env::var("POLYGON_BASE_URL")
                .unwrap_or_else(|_| RestSettings::default().base_url),
            timeout: parse_env_duration_secs(
                "POLYGON_HTTP_TIMEOUT_SECS",
                RestSettings::default().timeout,
            ),
        };

        let defaults = StreamSettings::default();
        let stream = StreamSettings {
            delayed: parse_env_bool("POLYGON_STREAM_DELAYED", defaults.delayed)?,
            url: std::env::var("POLYGON_STREAM_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            reconnect_delay_initial: parse_env_duration_millis(
                "POLYGON_RECONNECT_DELAY_INITIAL_MS",
                defaults.reconnect_delay_initial,
            ),
            reconnect_delay_max: parse_env_duration_secs(
                "POLYGON_RECONNECT_DELAY_MAX_SECS",
                defaults.reconnect_delay_max,
            ),
            reconnect_delay_multiplier: parse_env_f64(
                "POLYGON_RECONNECT_DELAY_MULTIPLIER",
                defaults.reconnect_delay_multiplier,
            ),
            max_reconnect_attempts: parse_env_u32(
                "POLYGON_MAX_RECONNECT_ATTEMPTS",
                defaults.max_reconnect_attempts,
            ),
        };

        let flat_files = match (
            std::env::var("POLYGON_S3_ACCESS_KEY").ok(),
            std::env::var("POLYGON_S3_SECRET_KEY").ok(),
        ) {
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar(
                    "POLYGON_S3_SECRET_KEY".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar(
                    "POLYGON_S3_ACCESS_KEY".to_string(),
                ));
            }
            (Some(access_key), Some(secret_key)) => Some(FlatFileSettings {
                credentials: S3Credentials::new(access_key, secret_key)?,
                endpoint: parse_env_string("POLYGON_S3_ENDPOINT", DEFAULT_S3_ENDPOINT),
                bucket: parse_env_string("POLYGON_S3_BUCKET", DEFAULT_S3_BUCKET),
                region: parse_env_string("POLYGON_S3_REGION", DEFAULT_S3_REGION),
            }),
        };

        Ok(Self {
            api_key: ApiKey::new(api_key)?,
            rest,
            stream,
            flat_files,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Value is empty.
    #[error("{0} cannot be empty")]
    EmptyValue(String),
    /// A streaming session was built without a handler.
    #[error("a stream handler is required")]
    MissingHandler,
    /// Value could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Offending value.
        value: String,
    },
}

fn parse_env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read a boolean variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for anything but
/// `true`/`false`/`1`/`0`/`yes`/`no`.
pub fn parse_env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(default);
    };
    parse_bool(&raw).ok_or(ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw,
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_env_duration_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}
