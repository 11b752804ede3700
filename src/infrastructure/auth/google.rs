//! Google sign-in token verification
//!
//! The frontend obtains a Google ID token and posts it here; we confirm it
//! with Google's tokeninfo endpoint and map it to a provider-neutral
//! identity.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Identity error
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token rejected by provider")]
    Rejected,
    #[error("Token issued for another application")]
    AudienceMismatch,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A verified signed-in identity as reported by the provider
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Identity verifier trait - lets tests swap in a fake provider
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a provider ID token and return the identity it asserts
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Google identity service configuration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub tokeninfo_url: String,
    pub client_id: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            tokeninfo_url: "https://oauth2.googleapis.com/tokeninfo".to_string(),
            client_id: std::env::var("GOOGLE_CLIENT_ID").ok(),
            timeout_secs: 10,
        }
    }
}

/// Google tokeninfo response (subset)
#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: String,
    aud: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    picture: Option<String>,
}

/// Google identity service implementation
pub struct GoogleIdentityService {
    client: Client,
    config: GoogleConfig,
}

impl GoogleIdentityService {
    pub fn new(config: GoogleConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityService {
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self
            .client
            .get(&self.config.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected);
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        if let Some(expected) = &self.config.client_id {
            if &info.aud != expected {
                return Err(IdentityError::AudienceMismatch);
            }
        }

        let display_name = if info.name.is_empty() {
            info.email.clone()
        } else {
            info.name
        };

        Ok(VerifiedIdentity {
            id: info.sub,
            email: info.email,
            display_name,
            avatar_url: info.picture,
        })
    }
}
