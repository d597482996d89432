// Authentication types

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Which identity server issues a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// WebLink identity server, shared by the primary, legacy and deduction hosts
    Standard,

    /// Payroll security endpoint
    Payroll,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Standard => f.write_str("standard"),
            TokenKind::Payroll => f.write_str("payroll"),
        }
    }
}

/// A client-credentials pair
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Token data from a grant response
#[derive(Debug, Clone)]
pub struct TokenData {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Client-credentials grant response, after key normalization
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}
