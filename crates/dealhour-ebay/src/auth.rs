//! Client-credentials token cache backed by the document store.
//!
//! The persisted document is the source of truth across restarts. A token
//! is reused while `now < expires_at`; `expires_at` is stored five minutes
//! earlier than the real expiry so a token is never used at the edge of its
//! lifetime.

use std::sync::Arc;

use dealhour_core::store::{load_json, save_json, TOKEN_KEY};
use dealhour_core::DocumentStore;
use reqwest::Client;

use crate::error::EbayError;
use crate::types::{StoredToken, TokenResponse};

/// Subtracted from the upstream lifetime before persisting.
pub const REFRESH_MARGIN_MS: i64 = 5 * 60 * 1000;

/// Returns the current time in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[must_use]
pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_millis())
}

pub struct TokenCache {
    client: Client,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    scope: String,
    store: Arc<dyn DocumentStore>,
    clock: Clock,
}

impl TokenCache {
    #[must_use]
    pub fn new(
        client: Client,
        base_url: &str,
        client_id: Option<String>,
        client_secret: Option<String>,
        scope: String,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            client,
            token_url: format!("{}/identity/v1/oauth2/token", base_url.trim_end_matches('/')),
            client_id,
            client_secret,
            scope,
            store,
            clock: system_clock(),
        }
    }

    /// Replace the wall clock, for deterministic expiry tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns a valid bearer token, fetching and persisting a new one only
    /// when the cached token is absent, malformed or expired.
    ///
    /// A failure to persist the new token is logged; the token is still
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`EbayError::CredentialsMissing`] if client id or secret is unset.
    /// - [`EbayError::UpstreamAuth`] if the identity endpoint rejects the credentials.
    /// - [`EbayError::Http`] / [`EbayError::UnexpectedStatus`] on transport failures.
    /// - [`EbayError::Deserialize`] if the token response has an unexpected shape.
    pub async fn access_token(&self) -> Result<String, EbayError> {
        let (Some(client_id), Some(client_secret)) =
            (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            return Err(EbayError::CredentialsMissing);
        };

        if let Some(cached) = self.cached_token() {
            if (self.clock)() < cached.expires_at {
                return Ok(cached.access_token);
            }
            tracing::debug!("cached eBay token expired; requesting a new one");
        }

        let fresh = self.request_token(client_id, client_secret).await?;
        let stored = StoredToken {
            expires_at: (self.clock)() + fresh.expires_in * 1000 - REFRESH_MARGIN_MS,
            access_token: fresh.access_token,
        };

        match save_json(self.store.as_ref(), TOKEN_KEY, &stored) {
            Ok(()) => tracing::info!(expires_at = stored.expires_at, "saved new eBay token"),
            Err(e) => tracing::error!(error = %e, "failed to persist eBay token; using it anyway"),
        }

        Ok(stored.access_token)
    }

    fn cached_token(&self) -> Option<StoredToken> {
        match load_json::<StoredToken>(self.store.as_ref(), TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable token cache");
                None
            }
        }
    }

    async fn request_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, EbayError> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if matches!(status.as_u16(), 400 | 401 | 403) {
            let body = response.text().await.unwrap_or_default();
            if body.contains("invalid_client") {
                tracing::error!("eBay client authentication failed; check EBAY_CLIENT_ID and EBAY_CLIENT_SECRET");
            }
            return Err(EbayError::UpstreamAuth {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            return Err(EbayError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.token_url.clone(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| EbayError::Deserialize {
            context: "oauth2 token".to_string(),
            source,
        })
    }
}
