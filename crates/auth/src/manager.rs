use std::sync::Arc;

use tracing::info;

use plaza_protocol::Identity;

use crate::{
    issuer::TokenIssuer,
    types::{AuthError, Credential},
};

/// Owns the session credential and its lifecycle.
///
/// `refresh` swaps the credential used for *subsequent* calls only; already
/// open channel membership never renegotiates on refresh.
pub struct TokenManager {
    issuer: Arc<dyn TokenIssuer>,
    current: Option<Credential>,
}

impl TokenManager {
    pub fn new(issuer: Arc<dyn TokenIssuer>) -> Self {
        Self {
            issuer,
            current: None,
        }
    }

    /// Initial issuance. Failure is terminal for the session.
    pub async fn acquire(&mut self, identity: &Identity) -> Result<&Credential, AuthError> {
        let credential = self.issuer.issue(identity).await?;
        info!(
            player_id = %identity.player_id,
            expires_at = %credential.expires_at(),
            "session credential acquired"
        );
        Ok(self.current.insert(credential))
    }

    /// Reactive refresh on an expiry notice from the transport.
    pub async fn refresh(&mut self, identity: &Identity) -> Result<&Credential, AuthError> {
        let credential = self.issuer.issue(identity).await?;
        info!(
            player_id = %identity.player_id,
            expires_at = %credential.expires_at(),
            "session credential refreshed"
        );
        Ok(self.current.insert(credential))
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::StaticTokenIssuer;

    #[tokio::test]
    async fn test_acquire_then_refresh_swaps_credential() {
        let issuer = Arc::new(StaticTokenIssuer::new("tok", 3600));
        let mut manager = TokenManager::new(issuer.clone());
        let identity = Identity::new("p1", "Alice");

        let first = manager.acquire(&identity).await.unwrap().token().to_string();
        let second = manager.refresh(&identity).await.unwrap().token().to_string();

        assert_ne!(first, second);
        assert_eq!(issuer.issued_count(), 2);
        assert_eq!(manager.credential().unwrap().token(), second);
    }

    #[tokio::test]
    async fn test_credential_empty_before_acquire() {
        let manager = TokenManager::new(Arc::new(StaticTokenIssuer::new("tok", 60)));
        assert!(manager.credential().is_none());
    }
}
