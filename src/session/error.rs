use thiserror::Error;

/// Errors from the viewing-session layer.
///
/// `Clone` is required: a single failed renewal is fanned out to every
/// caller coalesced on the same in-flight create, so the error crosses a
/// shared future boundary. Transport errors are flattened to strings at
/// the issuer boundary for the same reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session creation failed: {0}")]
    Creation(String),

    #[error("session issuer unavailable: {0}")]
    IssuerUnavailable(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SessionError {
    pub fn is_creation(&self) -> bool {
        matches!(self, SessionError::Creation(_))
    }
}
