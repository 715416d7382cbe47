//! HTTP client for thumbnail images.

use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

/// Configuration for the thumbnail client.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Value of the `Accept-Language` header.
    pub accept_language: String,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// HTTP client that downloads thumbnail images.
///
/// There is no retry policy: a failed request is reported once.
#[derive(Debug, Clone)]
pub struct ThumbnailClient {
    client: Client,
    config: ThumbnailConfig,
}

impl ThumbnailClient {
    /// Creates a new thumbnail client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ThumbnailConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ThumbnailConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ThumbnailConfig {
        &self.config
    }

    /// Downloads the image at `url`.
    ///
    /// Returns `Ok(None)` when the server answers with a non-success status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body cannot be read.
    pub async fn fetch(&self, url: &str) -> Result<Option<Bytes>, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.config.accept_language)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(url, status = response.status().as_u16(), "thumbnail not available");
            return Ok(None);
        }

        Ok(Some(response.bytes().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_config_default() {
        let config = ThumbnailConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, "Mozilla/5.0");
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = ThumbnailClient::with_defaults();
        assert!(client.is_ok());
    }
}
