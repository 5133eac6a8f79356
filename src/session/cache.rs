//! Viewing-session credential cache.
//!
//! Owns at most one live credential and renews it lazily. Any number of
//! concurrent callers asking for a session id while renewal is due share a
//! single in-flight create call; they all resolve to the same credential
//! (or the same failure).

use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::credential::DEFAULT_RENEWAL_BUFFER_SECS;
use super::{Credential, SessionError, SessionStats, SharedSessionIssuer};
use crate::config::CatalogConfig;

type RenewalFuture = Shared<BoxFuture<'static, Result<Credential, SessionError>>>;

/// Shared mutable cache state. The mutex is never held across an await;
/// the single-flight invariant holds because the pending handle is stored
/// synchronously, before the renewal future is first polled.
struct CacheState {
    current: Option<Credential>,
    pending: Option<RenewalFuture>,
}

/// Cache for the short-lived tile-server session credential.
///
/// Construct one per backend at the composition root and share it
/// (`Arc`) with every URL-building consumer.
pub struct SessionCache {
    issuer: SharedSessionIssuer,
    renewal_buffer: Duration,
    serve_stale_after_failure: bool,
    state: Mutex<CacheState>,
}

impl SessionCache {
    /// Cache with the default 5-minute renewal buffer and no stale fallback.
    pub fn new(issuer: SharedSessionIssuer) -> Self {
        Self::with_policy(
            issuer,
            Duration::seconds(DEFAULT_RENEWAL_BUFFER_SECS),
            false,
        )
    }

    /// Cache with an explicit renewal buffer and stale-fallback policy.
    ///
    /// With `serve_stale_after_failure` set, a failed renewal falls back to
    /// the previous credential for as long as it is not hard-expired,
    /// trading staleness risk for availability.
    pub fn with_policy(
        issuer: SharedSessionIssuer,
        renewal_buffer: Duration,
        serve_stale_after_failure: bool,
    ) -> Self {
        Self {
            issuer,
            renewal_buffer,
            serve_stale_after_failure,
            state: Mutex::new(CacheState {
                current: None,
                pending: None,
            }),
        }
    }

    pub fn from_config(issuer: SharedSessionIssuer, config: &CatalogConfig) -> Self {
        Self::with_policy(
            issuer,
            Duration::seconds(config.renewal_buffer_secs as i64),
            config.serve_stale_after_failure,
        )
    }

    /// Return a session id valid for at least the renewal buffer,
    /// creating or renewing the session as needed.
    ///
    /// Callers must request a fresh id for every URL they build rather
    /// than holding on to the returned string.
    pub async fn valid_session_id(&self) -> Result<String, SessionError> {
        let now = Utc::now();

        let renewal = {
            let mut state = self.state.lock();

            if let Some(cred) = &state.current {
                if cred.is_fresh(now, self.renewal_buffer) {
                    return Ok(cred.id().to_string());
                }
            }

            if let Some(pending) = &state.pending {
                // A renewal is already in flight: join it.
                pending.clone()
            } else {
                let issuer = Arc::clone(&self.issuer);
                let fut: RenewalFuture = async move {
                    let issued = issuer.create_session().await?;
                    Credential::from_issued(issued, Utc::now())
                }
                .boxed()
                .shared();
                state.pending = Some(fut.clone());
                debug!("image session renewal started");
                fut
            }
        };

        let result = renewal.clone().await;

        {
            let mut state = self.state.lock();
            // Only act if this renewal is still the one on record. A revoke
            // issued while it was in flight has already cleared `pending`
            // and wins: the fresh credential is discarded, not installed.
            let ours = state
                .pending
                .as_ref()
                .is_some_and(|p| p.ptr_eq(&renewal));
            if ours {
                state.pending = None;
                if let Ok(cred) = &result {
                    debug!(
                        session_id = %cred.id(),
                        expires_at = %cred.expires_at(),
                        "image session renewed"
                    );
                    state.current = Some(cred.clone());
                }
            }
        }

        match result {
            Ok(cred) => Ok(cred.id().to_string()),
            Err(err) => self.stale_fallback(err),
        }
    }

    /// Revoke the current session, if any.
    ///
    /// Local state is cleared unconditionally and first; the remote delete
    /// is best effort and its failure is only logged. Never returns an
    /// error and performs no remote call when nothing was cached.
    pub async fn revoke(&self) {
        let revoked = {
            let mut state = self.state.lock();
            state.pending = None;
            state.current.take()
        };

        let Some(cred) = revoked else {
            return;
        };

        match self.issuer.delete_session(cred.id()).await {
            Ok(()) => debug!(session_id = %cred.id(), "image session revoked"),
            Err(err) => warn!(
                session_id = %cred.id(),
                error = %err,
                "remote session revocation failed; local state already cleared"
            ),
        }
    }

    /// Diagnostic passthrough to the issuer's stats endpoint.
    pub async fn stats(&self) -> Result<SessionStats, SessionError> {
        self.issuer.session_stats().await.map_err(|err| match err {
            SessionError::IssuerUnavailable(_) => err,
            other => SessionError::IssuerUnavailable(other.to_string()),
        })
    }

    /// Id of the cached credential, fresh or stale, without triggering
    /// renewal. Diagnostics only.
    pub fn current_session_id(&self) -> Option<String> {
        self.state
            .lock()
            .current
            .as_ref()
            .map(|c| c.id().to_string())
    }

    fn stale_fallback(&self, err: SessionError) -> Result<String, SessionError> {
        if self.serve_stale_after_failure {
            let state = self.state.lock();
            if let Some(cred) = &state.current {
                if !cred.is_expired(Utc::now()) {
                    warn!(
                        session_id = %cred.id(),
                        error = %err,
                        "session renewal failed, serving stale credential until hard expiry"
                    );
                    return Ok(cred.id().to_string());
                }
            }
        }
        Err(err)
    }
}
