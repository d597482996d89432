// Token refresh logic

use chrono::{Duration, Utc};
use reqwest::Client;

use super::types::{ClientCredentials, TokenData, TokenResponse};
use crate::error::{PaylocityError, Result};
use crate::response::parse_response;

/// Lifetime assumed when the grant response omits `expires_in`
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Safety margin subtracted from the advertised lifetime
const EXPIRY_BUFFER_SECS: i64 = 60;

/// Upper bound on any token lifetime or refresh window we compute with
pub(super) const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// WebLink identity server token URL
pub fn identity_token_url(identity_host: &str) -> String {
    format!(
        "{}/IdentityServer/connect/token",
        identity_host.trim_end_matches('/')
    )
}

/// Payroll security token URL
pub fn payroll_token_url(token_endpoint: &str) -> String {
    format!(
        "{}/public/security/v1/token",
        token_endpoint.trim_end_matches('/')
    )
}

/// Client-credentials grant against the WebLink identity server
///
/// Credentials travel as HTTP Basic auth.
pub async fn refresh_standard(
    client: &Client,
    identity_host: &str,
    creds: &ClientCredentials,
) -> Result<TokenData> {
    tracing::info!("Refreshing WebLink access token...");

    let url = identity_token_url(identity_host);
    let form = [("grant_type", "client_credentials"), ("scope", "WebLinkAPI")];

    let response = client
        .post(&url)
        .basic_auth(&creds.client_id, Some(&creds.client_secret))
        .form(&form)
        .send()
        .await?;

    let token = token_from_response(response).await?;
    tracing::info!(
        "WebLink token refreshed, expires: {}",
        token.expires_at.to_rfc3339()
    );
    Ok(token)
}

/// Client-credentials grant against the payroll security endpoint
///
/// Unlike the WebLink flow, credentials travel in the form body.
pub async fn refresh_payroll(
    client: &Client,
    token_endpoint: &str,
    creds: &ClientCredentials,
) -> Result<TokenData> {
    tracing::info!("Refreshing payroll access token...");

    let url = payroll_token_url(token_endpoint);
    let id_prefix: String = creds.client_id.chars().take(8).collect();
    tracing::debug!(url = %url, client_id = %id_prefix, "Payroll token request");

    let form = [
        ("grant_type", "client_credentials"),
        ("scope", "all"),
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
    ];

    let response = client.post(&url).form(&form).send().await?;

    let token = token_from_response(response).await?;
    tracing::info!(
        "Payroll token refreshed, expires: {}",
        token.expires_at.to_rfc3339()
    );
    Ok(token)
}

async fn token_from_response(response: reqwest::Response) -> Result<TokenData> {
    let data: TokenResponse = parse_response(response).await?.into_model()?;

    let access_token = data
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| PaylocityError::Auth("response does not contain access_token".to_string()))?;

    // Calculate expiration time with buffer
    let expires_in = data.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
    let lifetime = expires_in
        .saturating_sub(EXPIRY_BUFFER_SECS)
        .clamp(0, MAX_TOKEN_LIFETIME_SECS);
    let expires_at = Utc::now() + Duration::seconds(lifetime);

    Ok(TokenData {
        access_token,
        expires_at,
    })
}
