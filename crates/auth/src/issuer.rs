use {async_trait::async_trait, serde::Deserialize, tracing::debug};

use plaza_protocol::Identity;

use crate::types::{AuthError, Credential, DEFAULT_TOKEN_TTL_SECS};

/// Exchanges a session identity for a credential.
///
/// The token-issuing endpoint is an external collaborator; this trait is its
/// interface boundary.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self, identity: &Identity) -> Result<Credential, AuthError>;
}

// ── HTTP issuer ──────────────────────────────────────────────────────────────

/// Response shape of the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    token: String,
    #[serde(default)]
    ttl_secs: Option<u64>,
}

/// POSTs the identity to the external token endpoint.
pub struct HttpTokenIssuer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTokenIssuer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    async fn issue(&self, identity: &Identity) -> Result<Credential, AuthError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(identity)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AuthError::Rejected(format!(
                "{} returned {}",
                self.endpoint,
                response.status()
            )));
        }
        let body: TokenResponse = response.json().await?;
        debug!(player_id = %identity.player_id, "issued session token");
        Ok(Credential::new(
            body.token,
            body.ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        ))
    }
}

// ── Static issuer ────────────────────────────────────────────────────────────

/// Fixed-token issuer for tests and the demo; counts issuances so refresh
/// behavior is observable.
pub struct StaticTokenIssuer {
    token: String,
    ttl_secs: u64,
    issued: std::sync::atomic::AtomicUsize,
}

impl StaticTokenIssuer {
    pub fn new(token: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            token: token.into(),
            ttl_secs,
            issued: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn issued_count(&self) -> usize {
        self.issued.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenIssuer for StaticTokenIssuer {
    async fn issue(&self, identity: &Identity) -> Result<Credential, AuthError> {
        let n = self
            .issued
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(Credential::new(
            format!("{}-{}-{n}", self.token, identity.player_id),
            self.ttl_secs,
        ))
    }
}
