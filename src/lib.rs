//! slidegate - image-catalog client with a cached, auto-renewing
//! tile-server viewing session.
//!
//! The tile server authorizes every tile, thumbnail, and DZI-manifest
//! request with a short-lived session credential. This crate owns that
//! credential's lifecycle: `SessionCache` creates it lazily, renews it
//! before expiry, and coalesces concurrent renewals into a single
//! in-flight create call, so a viewport fetching hundreds of tiles at
//! the moment of expiry costs the backend exactly one session.
//!
//! Wiring happens at the composition root:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use slidegate::api::{AssetUrlBuilder, ImageCatalogClient};
//! use slidegate::config::CatalogConfig;
//! use slidegate::session::SessionCache;
//!
//! # async fn wire() -> anyhow::Result<()> {
//! let config = CatalogConfig::from_env();
//! let client = ImageCatalogClient::new(&config)?.with_token("jwt".to_string());
//! let sessions = Arc::new(SessionCache::from_config(Arc::new(client), &config));
//! let urls = AssetUrlBuilder::new(&config, Arc::clone(&sessions));
//!
//! let dzi = urls.dzi_url("img-1").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod models;
pub mod session;

pub use api::{ApiError, AssetUrlBuilder, ImageCatalogClient};
pub use config::CatalogConfig;
pub use models::{ImageFilters, ImageRecord, ImageStatus, ImageUpdate};
pub use session::{
    Credential, IssuedSession, SessionCache, SessionError, SessionIssuer, SessionStats,
};
