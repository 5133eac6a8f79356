//! Client configuration.
//!
//! Defaults mirror the deployed front-end: a 10 second request timeout and
//! a 5 minute session renewal buffer. `from_env` reads the same environment
//! variable the web client is configured with.

use serde::{Deserialize, Serialize};

/// Default image-catalog base URL for local development
const DEFAULT_BASE_URL: &str = "http://localhost:3232/api/v1";

/// HTTP request timeout in seconds.
/// Tile serving must fail fast enough that the viewer can fall back to a
/// placeholder instead of stalling.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Seconds before expiry at which a session is renewed proactively
const DEFAULT_RENEWAL_BUFFER_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the image-catalog service, e.g. `https://host/api/v1`
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub renewal_buffer_secs: u64,
    /// Keep serving a stale-but-not-hard-expired session id when renewal
    /// fails, instead of surfacing the error.
    pub serve_stale_after_failure: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            renewal_buffer_secs: DEFAULT_RENEWAL_BUFFER_SECS,
            serve_stale_after_failure: false,
        }
    }
}

impl CatalogConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Self::strip_trailing_slash(base_url.into()),
            ..Self::default()
        }
    }

    /// Build from `IMAGE_CATALOG_API_BASE_URL`, falling back to the local
    /// development default.
    pub fn from_env() -> Self {
        match std::env::var("IMAGE_CATALOG_API_BASE_URL") {
            Ok(url) if !url.is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    fn strip_trailing_slash(mut url: String) -> String {
        while url.ends_with('/') {
            url.pop();
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.base_url, "http://localhost:3232/api/v1");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.renewal_buffer_secs, 300);
        assert!(!config.serve_stale_after_failure);
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let config = CatalogConfig::new("https://imaging.example.org/api/v1/");
        assert_eq!(config.base_url, "https://imaging.example.org/api/v1");
    }
}
