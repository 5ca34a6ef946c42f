use std::collections::HashMap;

use async_trait::async_trait;

use crate::types::Principal;

/// External identity provider contract.
///
/// The real implementation calls the federation's auth service; tests and
/// single-node deployments use `StaticTokenProvider`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Validate a bearer token. `None` means the token is unknown or expired;
    /// the caller decides whether that is an error (most routes require auth,
    /// public tenant rendering does not).
    async fn validate_token(&self, token: &str) -> Option<Principal>;
}

/// Token table resolved at startup (from configuration) or built by tests.
#[derive(Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

#[async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn validate_token(&self, token: &str) -> Option<Principal> {
        self.tokens.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[tokio::test]
    async fn static_provider_resolves_known_tokens() {
        let provider = StaticTokenProvider::new().with_token(
            "tk_club",
            Principal {
                user_id: 5,
                role: Role::Member,
            },
        );

        let principal = provider.validate_token("tk_club").await.unwrap();
        assert_eq!(principal.user_id, 5);
        assert!(provider.validate_token("tk_unknown").await.is_none());
    }
}
