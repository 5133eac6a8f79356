//! Data models for image-catalog entities.
//!
//! Session DTOs (`IssuedSession`, `SessionStats`) live with the session
//! layer in `crate::session`; this module holds the catalog records.

pub mod image;

pub use image::{ImageFilters, ImageRecord, ImageStatus, ImageUpdate};
