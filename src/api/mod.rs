//! REST API client module for the image-catalog service.
//!
//! This module provides the `ImageCatalogClient` for fetching catalog
//! records and issuing viewing sessions, plus the `AssetUrlBuilder` that
//! stamps tile/thumbnail/DZI URLs with a valid session id.
//!
//! All requests carry JWT bearer token authentication supplied by the
//! surrounding application's identity layer.

pub mod client;
pub mod error;
pub mod urls;

pub use client::ImageCatalogClient;
pub use error::ApiError;
pub use urls::AssetUrlBuilder;
