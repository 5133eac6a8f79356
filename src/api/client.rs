//! HTTP client for the image-catalog REST service.
//!
//! `ImageCatalogClient` makes bearer-token-authenticated requests for
//! catalog records and implements `SessionIssuer`, the seam the session
//! cache renews viewing credentials through.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::models::{ImageFilters, ImageRecord, ImageUpdate};
use crate::session::{IssuedSession, SessionError, SessionIssuer, SessionStats};

use super::ApiError;

/// Path prefix of the image-catalog service under the API base URL
const CATALOG_PREFIX: &str = "image-catalog";

/// Image-catalog API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ImageCatalogClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ImageCatalogClient {
    /// Create a new client from configuration
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests.
    /// The token comes from the ambient identity layer, not from this crate.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new client with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Catalog Methods =====

    /// Fetch a single image record by id
    pub async fn fetch_image(&self, image_id: &str) -> Result<ImageRecord> {
        if image_id.is_empty() {
            return Err(ApiError::InvalidArgument("image id is required".to_string()).into());
        }
        let url = format!("{}/{}/images/{}", self.base_url, CATALOG_PREFIX, image_id);
        self.get(&url).await
    }

    /// Fetch image records matching the given filters
    pub async fn fetch_images(&self, filters: &ImageFilters) -> Result<Vec<ImageRecord>> {
        let url = format!("{}/{}/images", self.base_url, CATALOG_PREFIX);

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(&filters.to_query())
            .send()
            .await
            .context("Failed to fetch image list")?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        debug!("Image list response received");

        Ok(Self::parse_image_list(&text)?)
    }

    /// Update mutable fields of an image record
    pub async fn update_image(&self, image_id: &str, update: &ImageUpdate) -> Result<ImageRecord> {
        if image_id.is_empty() {
            return Err(ApiError::InvalidArgument("image id is required".to_string()).into());
        }
        let url = format!("{}/{}/images/{}", self.base_url, CATALOG_PREFIX, image_id);

        let response = self
            .client
            .put(&url)
            .headers(self.auth_headers()?)
            .json(update)
            .send()
            .await
            .with_context(|| format!("Failed to send PUT request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .context("Failed to parse updated image record")
    }

    /// Parse the image list, accepting a direct array or the
    /// `{images}`/`{data}` wrapper variants the backend has shipped.
    fn parse_image_list(text: &str) -> Result<Vec<ImageRecord>, ApiError> {
        if let Ok(images) = serde_json::from_str::<Vec<ImageRecord>>(text) {
            return Ok(images);
        }

        #[derive(Deserialize)]
        struct ImagesWrapper {
            #[serde(default)]
            images: Vec<ImageRecord>,
            #[serde(default)]
            data: Vec<ImageRecord>,
        }

        let wrapper: ImagesWrapper = serde_json::from_str(text).map_err(|e| {
            ApiError::InvalidResponse(format!("unparseable image list: {}", e))
        })?;

        if !wrapper.images.is_empty() {
            Ok(wrapper.images)
        } else {
            Ok(wrapper.data)
        }
    }

    fn session_url(&self, suffix: &str) -> String {
        format!("{}/{}/sessions{}", self.base_url, CATALOG_PREFIX, suffix)
    }
}

#[async_trait]
impl SessionIssuer for ImageCatalogClient {
    async fn create_session(&self) -> Result<IssuedSession, SessionError> {
        let url = self.session_url("");
        let headers = self
            .auth_headers()
            .map_err(|e| SessionError::Creation(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| SessionError::Creation(format!("session create failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::Creation(format!("session create failed: {}", e)))?;

        if !status.is_success() {
            return Err(SessionError::Creation(
                ApiError::from_status(status, &text).to_string(),
            ));
        }

        debug!("Session create response received");
        IssuedSession::from_json(&text)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), SessionError> {
        let url = self.session_url(&format!("/{}", session_id));
        let headers = self
            .auth_headers()
            .map_err(|e| SessionError::IssuerUnavailable(e.to_string()))?;

        let response = self
            .client
            .delete(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| SessionError::IssuerUnavailable(format!("session delete failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::IssuerUnavailable(
                ApiError::from_status(status, &body).to_string(),
            ));
        }
        Ok(())
    }

    async fn session_stats(&self) -> Result<SessionStats, SessionError> {
        let url = self.session_url("/stats");
        let headers = self
            .auth_headers()
            .map_err(|e| SessionError::IssuerUnavailable(e.to_string()))?;

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| SessionError::IssuerUnavailable(format!("session stats failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::IssuerUnavailable(format!("session stats failed: {}", e)))?;

        if !status.is_success() {
            return Err(SessionError::IssuerUnavailable(
                ApiError::from_status(status, &text).to_string(),
            ));
        }

        serde_json::from_str(&text)
            .map_err(|e| SessionError::IssuerUnavailable(format!("unparseable stats: {}", e)))
    }
}
