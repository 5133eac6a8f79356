//! Asset URL construction for the tile viewer.
//!
//! Every DZI/thumbnail/tile URL carries a `session` query parameter the
//! tile server validates per request. A fresh session id is fetched from
//! the cache for each URL, so URLs built late in a long viewing session
//! still embed a non-expired credential.

use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::session::{SessionCache, SessionError};

pub struct AssetUrlBuilder {
    base_url: String,
    sessions: Arc<SessionCache>,
}

impl AssetUrlBuilder {
    pub fn new(config: &CatalogConfig, sessions: Arc<SessionCache>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            sessions,
        }
    }

    /// URL of the DZI manifest for an image
    pub async fn dzi_url(&self, image_id: &str) -> Result<String, SessionError> {
        Self::require_id(image_id)?;
        let session_id = self.sessions.valid_session_id().await?;
        Ok(format!(
            "{}/image-catalog/images/{}/image.dzi?session={}",
            self.base_url, image_id, session_id
        ))
    }

    /// URL of the thumbnail for an image
    pub async fn thumbnail_url(&self, image_id: &str) -> Result<String, SessionError> {
        Self::require_id(image_id)?;
        let session_id = self.sessions.valid_session_id().await?;
        Ok(format!(
            "{}/image-catalog/proxy/{}/thumbnail.jpg?session={}",
            self.base_url, image_id, session_id
        ))
    }

    /// URL of a single pyramid tile
    pub async fn tile_url(
        &self,
        image_id: &str,
        level: u32,
        col: u32,
        row: u32,
    ) -> Result<String, SessionError> {
        Self::require_id(image_id)?;
        let session_id = self.sessions.valid_session_id().await?;
        Ok(format!(
            "{}/image-catalog/proxy/{}/image_files/{}/{}_{}.jpeg?session={}",
            self.base_url, image_id, level, col, row, session_id
        ))
    }

    // Fails fast, before any network call
    fn require_id(image_id: &str) -> Result<(), SessionError> {
        if image_id.is_empty() {
            return Err(SessionError::InvalidArgument(
                "image id is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::session::{IssuedSession, SessionIssuer, SessionStats};

    struct StaticIssuer {
        create_calls: AtomicUsize,
    }

    impl StaticIssuer {
        fn new() -> Self {
            Self {
                create_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl SessionIssuer for StaticIssuer {
        async fn create_session(&self) -> Result<IssuedSession, SessionError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Ok(IssuedSession {
                session_id: "sess-1".to_string(),
                expires_in: 3600,
            })
        }

        async fn delete_session(&self, _session_id: &str) -> Result<(), SessionError> {
            Ok(())
        }

        async fn session_stats(&self) -> Result<SessionStats, SessionError> {
            Ok(SessionStats::default())
        }
    }

    fn builder() -> (Arc<StaticIssuer>, AssetUrlBuilder) {
        let issuer = Arc::new(StaticIssuer::new());
        let cache = Arc::new(SessionCache::new(issuer.clone()));
        let builder = AssetUrlBuilder::new(&CatalogConfig::default(), cache);
        (issuer, builder)
    }

    #[tokio::test]
    async fn test_urls_carry_session_parameter() {
        let (issuer, builder) = builder();

        let dzi = builder.dzi_url("img-1").await.unwrap();
        assert_eq!(
            dzi,
            "http://localhost:3232/api/v1/image-catalog/images/img-1/image.dzi?session=sess-1"
        );

        let thumb = builder.thumbnail_url("img-1").await.unwrap();
        assert_eq!(
            thumb,
            "http://localhost:3232/api/v1/image-catalog/proxy/img-1/thumbnail.jpg?session=sess-1"
        );

        let tile = builder.tile_url("img-1", 12, 3, 7).await.unwrap();
        assert_eq!(
            tile,
            "http://localhost:3232/api/v1/image-catalog/proxy/img-1/image_files/12/3_7.jpeg?session=sess-1"
        );

        // All three URLs shared one cached session
        assert_eq!(issuer.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_image_id_fails_without_issuer_call() {
        let (issuer, builder) = builder();

        let err = builder.dzi_url("").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidArgument(_)));
        assert_eq!(issuer.create_calls.load(Ordering::SeqCst), 0);
    }
}
