use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::sync::RwLock;

/// Environment variable prefix, e.g. `PAYLOCITY_CLIENT_ID`
pub const ENV_PREFIX: &str = "PAYLOCITY";

/// Suffix stripped from the primary host to reach the identity server
const API_VERSION_SUFFIX: &str = "/api/v2";

static GLOBAL: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Client settings
///
/// Nothing is validated up front: an empty host or a wrong secret shows up
/// as a URL or 401 error on the first request that needs it.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    // Hosts
    pub host: String,
    pub legacy_host: String,
    pub payroll_host: String,
    pub payroll_token_endpoint: String,

    // WebLink credentials
    pub client_id: String,
    pub client_secret: String,

    // Payroll credentials
    pub payroll_client_id: String,
    pub payroll_secret: String,

    pub company_id: String,

    // Payload encryption
    pub encryption: bool,
    pub encryption_key: Option<String>,

    // Timeouts (seconds)
    pub token_refresh_threshold: u64,
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            legacy_host: String::new(),
            payroll_host: String::new(),
            payroll_token_endpoint: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            payroll_client_id: String::new(),
            payroll_secret: String::new(),
            company_id: String::new(),
            encryption: false,
            encryption_key: None,
            token_refresh_threshold: 300,
            http_connect_timeout: 30,
            http_request_timeout: 300,
            log_level: "info".to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("legacy_host", &self.legacy_host)
            .field("payroll_host", &self.payroll_host)
            .field("payroll_token_endpoint", &self.payroll_token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("payroll_client_id", &self.payroll_client_id)
            .field("payroll_secret", &"[REDACTED]")
            .field("company_id", &self.company_id)
            .field("encryption", &self.encryption)
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "[REDACTED]"))
            .field("token_refresh_threshold", &self.token_refresh_threshold)
            .field("http_connect_timeout", &self.http_connect_timeout)
            .field("http_request_timeout", &self.http_request_timeout)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration with priority: ENV > .env file > defaults
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        // Values stay strings here; typed fields are parsed on deserialize,
        // so IDs like `00123` and secrets like `1e5` survive untouched
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read Paylocity configuration")?
            .try_deserialize()
            .context("Failed to parse Paylocity configuration")
    }

    /// Identity server root: the primary host without its `/api/v2` suffix
    pub fn identity_host(&self) -> &str {
        let host = self.host.trim_end_matches('/');
        host.strip_suffix(API_VERSION_SUFFIX).unwrap_or(host)
    }
}

/// Mutate the process-wide configuration in place
pub fn configure<F>(f: F)
where
    F: FnOnce(&mut Config),
{
    let mut guard = GLOBAL.write().unwrap_or_else(|e| e.into_inner());
    f(&mut guard);
}

/// Snapshot of the process-wide configuration
pub fn config() -> Config {
    GLOBAL.read().unwrap_or_else(|e| e.into_inner()).clone()
}
