//! Flat-File Client
//!
//! Downloads daily files from the S3-compatible bulk store. Every request is
//! a plain GET of a presigned, path-style URL
//! (`{endpoint}/{bucket}/{key}`), so no AWS SDK is needed.

use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use chrono::Utc;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use reqwest::{Client, Response, Url};
use tokio::io::AsyncWriteExt;

use super::error::FlatFileError;
use super::signer::Presigner;
use crate::infrastructure::config::{ClientConfig, ConfigError, FlatFileSettings};

/// Expiry of the URLs the client signs for its own downloads.
const DOWNLOAD_URL_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Client for the bulk file store.
#[derive(Debug, Clone)]
pub struct FlatFileClient {
    http: Client,
    presigner: Presigner,
    endpoint: String,
    bucket: String,
}

impl FlatFileClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(settings: &FlatFileSettings) -> Result<Self, FlatFileError> {
        let endpoint = settings.endpoint.trim_end_matches('/').to_string();
        Url::parse(&endpoint).map_err(|_| ConfigError::InvalidValue {
            key: "POLYGON_S3_ENDPOINT".to_string(),
            value: endpoint.clone(),
        })?;

        Ok(Self {
            http: Client::builder().build()?,
            presigner: Presigner::new(settings.credentials.clone(), settings.region.clone()),
            endpoint,
            bucket: settings.bucket.clone(),
        })
    }

    /// Create a client from full client configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no object store keys are
    /// configured.
    pub fn from_config(config: &ClientConfig) -> Result<Self, FlatFileError> {
        let settings = config
            .flat_files
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("POLYGON_S3_ACCESS_KEY".to_string()))?;
        Self::new(settings)
    }

    /// Unsigned path-style URL of an object.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the result is not a valid URL.
    pub fn object_url(&self, key: &str) -> Result<Url, FlatFileError> {
        let encoded: Vec<_> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        let raw = format!("{}/{}/{}", self.endpoint, self.bucket, encoded.join("/"));
        Url::parse(&raw).map_err(|_| {
            FlatFileError::Config(ConfigError::InvalidValue {
                key: "key".to_string(),
                value: key.to_string(),
            })
        })
    }

    /// A presigned GET URL for `key`, valid for `expires`.
    ///
    /// # Errors
    ///
    /// Returns `FlatFileError::Config` if the key or expiry is invalid.
    pub fn presign(&self, key: &str, expires: Duration) -> Result<Url, FlatFileError> {
        let url = self.object_url(key)?;
        Ok(self.presigner.presign(&url, expires, Utc::now())?)
    }

    /// Download a whole object into memory.
    ///
    /// # Errors
    ///
    /// Returns `FlatFileError::Status` for a non-success response and
    /// `FlatFileError::Http` on transport failure.
    pub async fn download(&self, key: &str) -> Result<Bytes, FlatFileError> {
        let response = self.fetch(key).await?;
        Ok(response.bytes().await?)
    }

    /// Stream an object into a local file, returning the bytes written.
    ///
    /// # Errors
    ///
    /// As [`FlatFileClient::download`], plus `FlatFileError::Io` for local
    /// file failures.
    pub async fn download_to(&self, key: &str, path: impl AsRef<Path>) -> Result<u64, FlatFileError> {
        let response = self.fetch(key).await?;
        let mut file = tokio::fs::File::create(path.as_ref()).await?;
        let mut body = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::info!(key, path = %path.as_ref().display(), bytes = written, "Flat file downloaded");
        Ok(written)
    }

    /// Open an object as a stream of `chunk_size`-byte chunks.
    ///
    /// Every chunk is exactly `chunk_size` bytes except possibly the last.
    /// The stream is forward-only; the body is read as it is polled.
    ///
    /// # Errors
    ///
    /// Returns `FlatFileError::Config` for a zero `chunk_size`, and the
    /// errors of [`FlatFileClient::download`] for the initial request.
    pub async fn stream(
        &self,
        key: &str,
        chunk_size: usize,
    ) -> Result<BoxStream<'static, Result<Bytes, FlatFileError>>, FlatFileError> {
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "chunk_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        let response = self.fetch(key).await?;
        Ok(rechunk(
            response.bytes_stream().map_err(FlatFileError::Http),
            chunk_size,
        )
        .boxed())
    }

    async fn fetch(&self, key: &str) -> Result<Response, FlatFileError> {
        let url = self.presign(key, DOWNLOAD_URL_EXPIRY)?;
        tracing::debug!(key, bucket = %self.bucket, "GET flat file");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(key, status = status.as_u16(), "Flat file request failed");
            return Err(FlatFileError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

// =============================================================================
// Rechunking
// =============================================================================

struct Rechunk<S> {
    inner: Pin<Box<S>>,
    buffer: BytesMut,
    done: bool,
}

/// Regroup a byte stream into fixed-size chunks.
///
/// The stream ends after the first error.
fn rechunk<S, E>(inner: S, chunk_size: usize) -> impl Stream<Item = Result<Bytes, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Send + 'static,
{
    let state = Rechunk {
        inner: Box::pin(inner),
        buffer: BytesMut::with_capacity(chunk_size),
        done: false,
    };

    stream::unfold(state, move |mut state| async move {
        loop {
            if state.buffer.len() >= chunk_size {
                let chunk = state.buffer.split_to(chunk_size).freeze();
                return Some((Ok(chunk), state));
            }
            if state.done {
                if state.buffer.is_empty() {
                    return None;
                }
                let chunk = state.buffer.split().freeze();
                return Some((Ok(chunk), state));
            }
            match state.inner.next().await {
                Some(Ok(bytes)) => state.buffer.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    state.done = true;
                    state.buffer.clear();
                    return Some((Err(e), state));
                }
                None => state.done = true,
            }
        }
    })
}
