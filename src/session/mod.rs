//! Viewing-session management for the tile server.
//!
//! This module provides:
//! - `Credential`: an immutable, short-lived session credential
//! - `SessionIssuer`: the backend seam that creates/revokes sessions
//! - `SessionCache`: lazy, auto-renewing, single-flight credential cache
//!
//! Credentials live only in process memory and are re-acquired on restart.

pub mod cache;
pub mod credential;
pub mod error;
pub mod issuer;

pub use cache::SessionCache;
pub use credential::{Credential, IssuedSession, SessionStats, SessionUsage};
pub use error::SessionError;
pub use issuer::{SessionIssuer, SharedSessionIssuer};
