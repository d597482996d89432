use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tokio::sync::RwLock;

use super::refresh;
use super::types::{ClientCredentials, TokenData, TokenKind};
use crate::config::Config;
use crate::error::Result;

/// Authentication manager
/// One cached token per [`TokenKind`], refreshed when absent or close to expiry
pub struct AuthManager {
    /// HTTP client for token requests
    client: Client,

    /// Identity server root for standard tokens
    identity_host: String,

    /// Payroll token endpoint root
    payroll_token_endpoint: String,

    standard_credentials: ClientCredentials,
    payroll_credentials: ClientCredentials,

    standard_token: RwLock<Option<TokenData>>,
    payroll_token: RwLock<Option<TokenData>>,

    /// Token refresh threshold in seconds
    refresh_threshold: i64,
}

impl AuthManager {
    /// Create a new AuthManager with empty token slots
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            identity_host: config.identity_host().to_string(),
            payroll_token_endpoint: config.payroll_token_endpoint.clone(),
            standard_credentials: ClientCredentials {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            },
            payroll_credentials: ClientCredentials {
                client_id: config.payroll_client_id.clone(),
                client_secret: config.payroll_secret.clone(),
            },
            standard_token: RwLock::new(None),
            payroll_token: RwLock::new(None),
            refresh_threshold: i64::try_from(config.token_refresh_threshold)
                .unwrap_or(i64::MAX)
                .min(refresh::MAX_TOKEN_LIFETIME_SECS),
        }
    }

    /// Pre-populate a slot so no grant request is made
    /// Available in test builds and integration tests
    #[cfg(any(test, feature = "test-utils"))]
    pub async fn seed_token(&self, kind: TokenKind, access_token: String, expires_at: DateTime<Utc>) {
        let mut slot = self.slot(kind).write().await;
        *slot = Some(TokenData {
            access_token,
            expires_at,
        });
    }

    fn slot(&self, kind: TokenKind) -> &RwLock<Option<TokenData>> {
        match kind {
            TokenKind::Standard => &self.standard_token,
            TokenKind::Payroll => &self.payroll_token,
        }
    }

    /// Check if token is expiring soon (within threshold)
    fn is_expiring_soon(&self, expires_at: DateTime<Utc>) -> bool {
        expires_at <= Utc::now() + Duration::seconds(self.refresh_threshold)
    }

    /// Check if token is actually expired (not just expiring soon)
    fn is_expired(expires_at: DateTime<Utc>) -> bool {
        Utc::now() >= expires_at
    }

    async fn fetch(&self, kind: TokenKind) -> Result<TokenData> {
        match kind {
            TokenKind::Standard => {
                refresh::refresh_standard(
                    &self.client,
                    &self.identity_host,
                    &self.standard_credentials,
                )
                .await
            }
            TokenKind::Payroll => {
                refresh::refresh_payroll(
                    &self.client,
                    &self.payroll_token_endpoint,
                    &self.payroll_credentials,
                )
                .await
            }
        }
    }

    /// Get a valid access token, refreshing if necessary
    /// Concurrent callers wait on the slot's write lock, so one refresh runs per expiry
    pub async fn get_access_token(&self, kind: TokenKind) -> Result<String> {
        {
            let current = self.slot(kind).read().await;
            if let Some(token) = current.as_ref() {
                if !self.is_expiring_soon(token.expires_at) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut slot = self.slot(kind).write().await;

        // Another task may have refreshed while we waited
        if let Some(token) = slot.as_ref() {
            if !self.is_expiring_soon(token.expires_at) {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!(kind = %kind, "Access token missing or expiring, refreshing...");

        match self.fetch(kind).await {
            Ok(token) => {
                let access_token = token.access_token.clone();
                *slot = Some(token);
                Ok(access_token)
            }
            Err(e) => {
                tracing::error!(kind = %kind, "Token refresh failed: {}", e);

                // Graceful degradation: if token isn't actually expired yet, use it
                if let Some(token) = slot.as_ref() {
                    if !Self::is_expired(token.expires_at) {
                        tracing::warn!(
                            kind = %kind,
                            "Using existing token despite refresh failure (not yet expired)"
                        );
                        return Ok(token.access_token.clone());
                    }
                }

                Err(e)
            }
        }
    }

    /// Drop a cached token; the next request fetches a new one
    pub async fn invalidate(&self, kind: TokenKind) {
        let mut slot = self.slot(kind).write().await;
        if slot.take().is_some() {
            tracing::debug!(kind = %kind, "Access token invalidated");
        }
    }
}
