use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur while downloading a feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed's config section has no `url` key
    #[error("No url configured")]
    MissingUrl,
    /// The configured url does not parse
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Downloads feed documents.
///
/// One GET per call, no retry. The optional timeout covers the whole
/// request including the body; without it a stalled server stalls the
/// caller.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl Fetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("grs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }

    /// Fetch the raw document at `url`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::MissingUrl`] - `url` is `None`
    /// - [`FetchError::InvalidUrl`] - `url` does not parse
    /// - [`FetchError::Network`] - Connection, TLS or body read failure
    /// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
    /// - [`FetchError::Timeout`] - The configured timeout elapsed
    pub async fn fetch(&self, url: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let url = url.ok_or(FetchError::MissingUrl)?;
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let request = self.get(parsed);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| FetchError::Timeout(limit))?,
            None => request.await,
        }
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url = %url, "Fetching feed");
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        tracing::debug!(url = %url, bytes = bytes.len(), "Fetched feed");
        Ok(bytes.to_vec())
    }
}
