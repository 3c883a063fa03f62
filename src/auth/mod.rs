use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::error::AppError;
use crate::feed::memory::MemoryStore;

#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credential")]
    InvalidCredential,

    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Exchanges the opaque credential handed over by the sign-in widget for
/// a verified identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError>;
}

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Verifies Google sign-in credentials against the tokeninfo endpoint.
pub struct GoogleIdentityProvider {
    http: reqwest::Client,
    audience: Option<String>,
}

#[derive(Deserialize)]
struct TokenInfo {
    email: String,
    #[serde(default)]
    aud: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(http: reqwest::Client, audience: Option<String>) -> Self {
        Self { http, audience }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|err| AuthError::Provider(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidCredential);
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|err| AuthError::Provider(err.to_string()))?;

        if let Some(expected) = &self.audience {
            if info.aud.as_deref() != Some(expected.as_str()) {
                return Err(AuthError::InvalidCredential);
            }
        }

        Ok(Identity { email: info.email })
    }
}

/// The whole authorization model: verify the credential, then probe for
/// the privileged operator document. Any failure anywhere is the same
/// uniform denial.
pub async fn authorize(
    provider: &dyn IdentityProvider,
    store: &MemoryStore,
    credential: &str,
) -> Result<Identity, AppError> {
    let identity = provider.verify(credential).await.map_err(|err| {
        warn!(error = %err, "credential verification failed");
        AppError::Denied
    })?;

    if store.is_operator(&identity.email) {
        Ok(identity)
    } else {
        warn!(email = %identity.email, "operator probe miss");
        Err(AppError::Denied)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::{authorize, AuthError, Identity, IdentityProvider};
    use crate::error::AppError;
    use crate::feed::memory::MemoryStore;

    struct StaticProvider {
        email: Option<String>,
    }

    #[async_trait]
    impl IdentityProvider for StaticProvider {
        async fn verify(&self, _credential: &str) -> Result<Identity, AuthError> {
            match &self.email {
                Some(email) => Ok(Identity {
                    email: email.clone(),
                }),
                None => Err(AuthError::InvalidCredential),
            }
        }
    }

    #[tokio::test]
    async fn registered_operator_is_authorized() {
        let store = MemoryStore::new(16);
        store.register_operator("organizer@example.com");
        let provider = StaticProvider {
            email: Some("organizer@example.com".to_string()),
        };

        let identity = authorize(&provider, &store, "credential")
            .await
            .expect("authorized");
        assert_eq!(identity.email, "organizer@example.com");
    }

    #[tokio::test]
    async fn probe_miss_and_bad_credential_are_indistinguishable() {
        let store = MemoryStore::new(16);
        let known_user = StaticProvider {
            email: Some("stranger@example.com".to_string()),
        };
        let bad_credential = StaticProvider { email: None };

        let miss = authorize(&known_user, &store, "credential").await;
        let invalid = authorize(&bad_credential, &store, "credential").await;

        assert!(matches!(miss, Err(AppError::Denied)));
        assert!(matches!(invalid, Err(AppError::Denied)));
    }
}
