use crate::feed::parser::{parse_feed, ParseResult};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading the upstream advisory feed.
///
/// Any of these aborts the run; nothing is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Feed XML could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the configured size limit
    #[error("Response too large (limit {0} bytes)")]
    ResponseTooLarge(usize),
    /// Local input file could not be read
    #[error("Failed to read '{}': {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where the upstream RSS document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Url(url) => f.write_str(url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Limits applied to an HTTP fetch.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub timeout: Duration,
    pub max_bytes: usize,
}

/// Loads and parses the upstream document.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::Timeout`] - Request exceeded `limits.timeout`
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::ResponseTooLarge`] - Body exceeded `limits.max_bytes`
/// - [`FetchError::File`] - Local file could not be read
/// - [`FetchError::Parse`] - Invalid RSS/Atom XML
pub async fn load_entries(
    client: &reqwest::Client,
    source: &FeedSource,
    limits: FetchLimits,
) -> Result<ParseResult, FetchError> {
    tracing::info!(source = %source, "Fetch");
    let bytes = match source {
        FeedSource::Url(url) => fetch_bytes(client, url, limits).await?,
        FeedSource::File(path) => std::fs::read(path).map_err(|e| FetchError::File {
            path: path.clone(),
            source: e,
        })?,
    };

    let result = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
    if result.skipped > 0 {
        tracing::warn!(source = %source, skipped = result.skipped, "Items without links skipped");
    }
    tracing::debug!(entries = result.entries.len(), "Parsed upstream feed");
    Ok(result)
}

/// Sends the request and reads the body under a single `limits.timeout` budget.
async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    limits: FetchLimits,
) -> Result<Vec<u8>, FetchError> {
    tokio::time::timeout(limits.timeout, request_bytes(client, url, limits.max_bytes))
        .await
        .map_err(|_| FetchError::Timeout(limits.timeout))?
}

async fn request_bytes(
    client: &reqwest::Client,
    url: &str,
    max_bytes: usize,
) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await.map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    read_limited_bytes(response, max_bytes).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
