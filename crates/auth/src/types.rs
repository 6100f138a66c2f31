use {
    chrono::{DateTime, Duration, Utc},
    secrecy::{ExposeSecret, SecretString},
};

/// Provider sessions time out after one hour and need a fresh token.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Credential issuance or refresh failure. Terminal for the session —
/// the orchestrator surfaces it to the caller without retrying.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token endpoint unreachable: {0}")]
    Endpoint(#[from] reqwest::Error),
    #[error("token endpoint rejected identity: {0}")]
    Rejected(String),
    #[error("token issuance failed: {0}")]
    Issue(String),
}

/// An opaque session token with its validity window.
#[derive(Clone)]
pub struct Credential {
    token: SecretString,
    issued_at: DateTime<Utc>,
    ttl_secs: u64,
}

impl Credential {
    pub fn new(token: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            token: SecretString::new(token.into()),
            issued_at: Utc::now(),
            ttl_secs,
        }
    }

    /// The raw token, for transport connection establishment only.
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(self.ttl_secs as i64)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_window() {
        let cred = Credential::new("tok", 3600);
        assert!(!cred.is_expired(cred.issued_at()));
        assert!(!cred.is_expired(cred.issued_at() + Duration::seconds(3599)));
        assert!(cred.is_expired(cred.issued_at() + Duration::seconds(3600)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new("very-secret", DEFAULT_TOKEN_TTL_SECS);
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
