// Connection builder
// Base URL and default headers for each host class

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Url;

use crate::config::Config;
use crate::error::{PaylocityError, Result};
use crate::routing::Target;

/// A host class bound to its base URL and default headers
#[derive(Debug, Clone)]
pub struct Connection {
    target: Target,
    base_url: Url,
    headers: HeaderMap,
}

impl Connection {
    /// Build the connection for `target` from the current settings
    pub fn build(config: &Config, target: Target) -> Result<Self> {
        let raw = match target {
            Target::Primary => company_scoped(&config.host, &config.company_id),
            Target::Legacy => company_scoped(&config.legacy_host, &config.company_id),
            Target::LegacyDeduction => format!("{}/", config.legacy_host.trim_end_matches('/')),
            Target::Payroll => company_scoped(&config.payroll_host, &config.company_id),
        };

        let base_url = Url::parse(&raw).map_err(|e| {
            PaylocityError::Config(format!("invalid {} base URL {:?}: {}", target, raw, e))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if target != Target::Payroll {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        tracing::debug!(target_host = %target, base_url = %base_url, "Connection built");

        Ok(Self {
            target,
            base_url,
            headers,
        })
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Resolve a resource path against the base URL
    ///
    /// A leading slash is dropped so the company prefix is kept. Paths that
    /// resolve outside the base URL (absolute URLs, `..` segments) are
    /// rejected so the bearer token never leaves this host and scope.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| PaylocityError::Config(format!("invalid resource path {:?}: {}", path, e)))?;

        if !url.as_str().starts_with(self.base_url.as_str()) {
            return Err(PaylocityError::Config(format!(
                "resource path {:?} escapes {}",
                path, self.base_url
            )));
        }

        Ok(url)
    }
}

fn company_scoped(host: &str, company_id: &str) -> String {
    format!("{}/companies/{}/", host.trim_end_matches('/'), company_id)
}
