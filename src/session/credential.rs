use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::SessionError;

/// Buffer time before expiry to trigger renewal (5 minutes)
pub const DEFAULT_RENEWAL_BUFFER_SECS: i64 = 5 * 60;

/// Wire response from the session-creation endpoint.
///
/// Some backend revisions wrap the payload in a `session` object; see
/// `IssuedSession::from_json` for the tolerant parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedSession {
    pub session_id: String,
    /// Lifetime in seconds, relative to issue time.
    pub expires_in: u64,
}

impl IssuedSession {
    /// Parse an issuer response, accepting both the bare object and the
    /// `{"session": {...}}` wrapper.
    pub fn from_json(text: &str) -> Result<Self, SessionError> {
        #[derive(Deserialize)]
        struct Wrapper {
            session: IssuedSession,
        }

        if let Ok(issued) = serde_json::from_str::<IssuedSession>(text) {
            return Ok(issued);
        }
        serde_json::from_str::<Wrapper>(text)
            .map(|w| w.session)
            .map_err(|e| SessionError::Creation(format!("unparseable issuer response: {}", e)))
    }
}

/// An immutable, short-lived credential authorizing tile/thumbnail/DZI
/// requests. Renewal replaces the credential; it is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    id: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential from an issuer response at the given issue time.
    ///
    /// Rejects an empty id or a zero lifetime (the `expires_at > issued_at`
    /// invariant would not hold).
    pub fn from_issued(issued: IssuedSession, now: DateTime<Utc>) -> Result<Self, SessionError> {
        if issued.session_id.is_empty() {
            return Err(SessionError::Creation(
                "issuer returned an empty session id".to_string(),
            ));
        }
        if issued.expires_in == 0 {
            return Err(SessionError::Creation(
                "issuer returned a zero session lifetime".to_string(),
            ));
        }
        Ok(Self {
            id: issued.session_id,
            issued_at: now,
            expires_at: now + Duration::seconds(issued.expires_in as i64),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True while the credential is still outside the renewal buffer,
    /// i.e. `now + buffer < expires_at`. A fresh credential is served
    /// without suspension.
    pub fn is_fresh(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        now + buffer < self.expires_at
    }

    /// True once the issuer-stated expiry has passed (hard expiry).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Seconds remaining until hard expiry (for diagnostics).
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// Per-session usage record reported by the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUsage {
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub request_count: u64,
}

/// Aggregate session statistics from the issuer (diagnostic only).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionStats {
    #[serde(default)]
    pub active_sessions: u64,
    #[serde(default)]
    pub sessions: Vec<SessionUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_round_trip_expiry_arithmetic() {
        let issued = IssuedSession {
            session_id: "abc".to_string(),
            expires_in: 600,
        };
        let cred = Credential::from_issued(issued, at(0)).unwrap();

        assert_eq!(cred.id(), "abc");
        assert_eq!(cred.expires_at(), at(600));
        // With a zero buffer the credential is fresh one second before expiry
        assert!(cred.is_fresh(at(599), Duration::seconds(0)));
        assert!(!cred.is_fresh(at(600), Duration::seconds(0)));
        assert!(cred.is_expired(at(600)));
    }

    #[test]
    fn test_renewal_buffer_arithmetic() {
        // 10-minute credential, 5-minute buffer
        let issued = IssuedSession {
            session_id: "abc".to_string(),
            expires_in: 600,
        };
        let cred = Credential::from_issued(issued, at(0)).unwrap();
        let buffer = Duration::seconds(DEFAULT_RENEWAL_BUFFER_SECS);

        assert!(cred.is_fresh(at(4 * 60), buffer)); // 4 minutes in: hit
        assert!(!cred.is_fresh(at(6 * 60), buffer)); // 6 minutes in: renew
        assert!(!cred.is_expired(at(6 * 60))); // but not hard-expired yet
    }

    #[test]
    fn test_rejects_empty_id_and_zero_lifetime() {
        let empty = IssuedSession {
            session_id: String::new(),
            expires_in: 600,
        };
        assert!(Credential::from_issued(empty, at(0)).is_err());

        let zero = IssuedSession {
            session_id: "abc".to_string(),
            expires_in: 0,
        };
        assert!(Credential::from_issued(zero, at(0)).is_err());
    }

    #[test]
    fn test_issued_session_parses_bare_and_wrapped() {
        let bare = r#"{"session_id": "s-1", "expires_in": 1800}"#;
        let parsed = IssuedSession::from_json(bare).unwrap();
        assert_eq!(parsed.session_id, "s-1");
        assert_eq!(parsed.expires_in, 1800);

        let wrapped = r#"{"session": {"session_id": "s-2", "expires_in": 600}}"#;
        let parsed = IssuedSession::from_json(wrapped).unwrap();
        assert_eq!(parsed.session_id, "s-2");

        assert!(IssuedSession::from_json("not json").is_err());
    }

    #[test]
    fn test_stats_parse() {
        let json = r#"{
            "active_sessions": 2,
            "sessions": [
                {"session_id": "a", "user_id": 7, "request_count": 41},
                {"session_id": "b"}
            ]
        }"#;
        let stats: SessionStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.active_sessions, 2);
        assert_eq!(stats.sessions.len(), 2);
        assert_eq!(stats.sessions[0].request_count, 41);
        assert_eq!(stats.sessions[1].user_id, None);
    }
}
