use std::sync::Arc;

use async_trait::async_trait;

use super::{IssuedSession, SessionError, SessionStats};

/// Backend endpoint that creates and revokes viewing sessions.
///
/// Every call is a remote, fallible suspension point. The cache is the only
/// intended caller of `create_session`; consumers that need a session id go
/// through `SessionCache::valid_session_id` instead.
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    /// Request a new session. Failures surface as `SessionError::Creation`.
    async fn create_session(&self) -> Result<IssuedSession, SessionError>;

    /// Revoke a session by id. Idempotent on the server side; failures
    /// surface as `SessionError::IssuerUnavailable`.
    async fn delete_session(&self, session_id: &str) -> Result<(), SessionError>;

    /// Fetch aggregate session statistics (diagnostic only).
    async fn session_stats(&self) -> Result<SessionStats, SessionError>;
}

/// Shared issuer handle for injection into the cache.
pub type SharedSessionIssuer = Arc<dyn SessionIssuer>;
