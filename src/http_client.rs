use anyhow::Context;
use dashmap::DashMap;
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthManager, TokenKind};
use crate::config::Config;
use crate::connection::Connection;
use crate::encryption::{PayloadEncryptor, SecureContentEncryptor};
use crate::error::{PaylocityError, Result};
use crate::multipart::MultipartEncoder;
use crate::response::{parse_response, ApiResponse};
use crate::routing::{RouteTable, Target};

/// HTTP client for the Paylocity APIs
///
/// Every call is attempt-once: no retries, no backoff. A 429 surfaces as
/// [`PaylocityError::TooManyRequests`].
pub struct PaylocityClient {
    /// Shared HTTP client
    client: Client,

    /// Settings snapshot taken at construction
    config: Config,

    /// Token cache, one slot per identity server
    auth_manager: Arc<AuthManager>,

    routes: RouteTable,

    /// Memoized per host class
    connections: DashMap<Target, Arc<Connection>>,

    encryptor: Option<Arc<dyn PayloadEncryptor>>,

    multipart: MultipartEncoder,
}

impl PaylocityClient {
    /// Create a client from the process-wide configuration
    pub fn new() -> Result<Self> {
        Self::with_config(crate::config::config())
    }

    /// Create a client from explicit settings
    pub fn with_config(config: Config) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.http_connect_timeout))
            .timeout(Duration::from_secs(config.http_request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        let encryptor: Option<Arc<dyn PayloadEncryptor>> = match config.encryption_key.as_deref() {
            Some(key) => Some(Arc::new(SecureContentEncryptor::from_base64(key)?)),
            None => None,
        };

        let auth_manager = Arc::new(AuthManager::new(&config, client.clone()));

        Ok(Self {
            client,
            config,
            auth_manager,
            routes: RouteTable::default(),
            connections: DashMap::new(),
            encryptor,
            multipart: MultipartEncoder::default(),
        })
    }

    /// Replace the resource-to-host table
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Replace the payload encryptor used when encryption is on
    pub fn with_encryptor(mut self, encryptor: Arc<dyn PayloadEncryptor>) -> Self {
        self.encryptor = Some(encryptor);
        self
    }

    /// Replace the multipart encoder used for payroll submissions
    pub fn with_multipart_encoder(mut self, encoder: MultipartEncoder) -> Self {
        self.multipart = encoder;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth_manager(&self) -> &Arc<AuthManager> {
        &self.auth_manager
    }

    /// Host class a generic request for `path` goes to
    pub fn route(&self, path: &str, legacy: bool) -> Target {
        self.routes.resolve(path, legacy)
    }

    /// Connection for `target`, built on first use
    pub fn connection(&self, target: Target) -> Result<Arc<Connection>> {
        if let Some(existing) = self.connections.get(&target) {
            return Ok(Arc::clone(existing.value()));
        }

        let connection = Arc::new(Connection::build(&self.config, target)?);
        let entry = self
            .connections
            .entry(target)
            .or_insert_with(|| Arc::clone(&connection));
        Ok(Arc::clone(entry.value()))
    }

    pub async fn get(&self, path: &str, legacy: bool) -> Result<ApiResponse> {
        let target = self.route(path, legacy);
        self.request::<Value>(Method::GET, target, path, None).await
    }

    pub async fn post<B>(&self, path: &str, body: &B, legacy: bool) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let target = self.route(path, legacy);
        self.request(Method::POST, target, path, Some(body)).await
    }

    pub async fn put<B>(&self, path: &str, body: &B, legacy: bool) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let target = self.route(path, legacy);
        self.request(Method::PUT, target, path, Some(body)).await
    }

    pub async fn patch<B>(&self, path: &str, body: &B, legacy: bool) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let target = self.route(path, legacy);
        self.request(Method::PATCH, target, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str, legacy: bool) -> Result<ApiResponse> {
        let target = self.route(path, legacy);
        self.request::<Value>(Method::DELETE, target, path, None).await
    }

    /// Send a request to an explicit host class
    pub async fn request<B>(
        &self,
        method: Method,
        target: Target,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let connection = self.connection(target)?;
        let url = connection.url_for(path)?;

        let payload = match body {
            Some(body) => Some(self.encode_body(body)?),
            None => None,
        };

        let token = self.auth_manager.get_access_token(target.token_kind()).await?;

        tracing::debug!(
            method = %method,
            url = %url,
            target_host = %target,
            "Sending HTTP request"
        );

        let mut request = self
            .client
            .request(method, url)
            .headers(connection.headers().clone())
            .bearer_auth(token);
        if let Some(payload) = payload {
            request = request.body(payload);
        }

        let response = request.send().await?;
        tracing::debug!(status = %response.status(), "Received HTTP response");

        parse_response(response).await
    }

    /// Serialize a body, sealing it first when encryption is on
    fn encode_body<B>(&self, body: &B) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let value = serde_json::to_value(body)
            .map_err(|e| PaylocityError::Decode(format!("Failed to serialize body: {}", e)))?;

        let value = if self.config.encryption {
            let encryptor = self.encryptor.as_ref().ok_or_else(|| {
                PaylocityError::Config("encryption is enabled but no encryption_key is set".to_string())
            })?;
            encryptor.encrypt(&value)?
        } else {
            value
        };

        Ok(value.to_string())
    }

    /// Submission channel for multipart payroll requests
    pub fn payroll_connection(&self) -> Result<PayrollConnection<'_>> {
        Ok(PayrollConnection {
            client: self,
            connection: self.connection(Target::Payroll)?,
        })
    }
}

/// Payroll host bound to its token source and multipart encoder
pub struct PayrollConnection<'a> {
    client: &'a PaylocityClient,
    connection: Arc<Connection>,
}

impl PayrollConnection<'_> {
    pub fn base_url(&self) -> &Url {
        self.connection.base_url()
    }

    /// POST `fields` as `multipart/form-data` to `path` on the payroll host
    pub async fn submit<'f, I>(&self, path: &str, fields: I) -> Result<ApiResponse>
    where
        I: IntoIterator<Item = (&'f str, &'f str)>,
    {
        let url = self.connection.url_for(path)?;
        let form = self.client.multipart.encode(fields)?;
        let token = self
            .client
            .auth_manager
            .get_access_token(TokenKind::Payroll)
            .await?;

        tracing::debug!(url = %url, "Submitting payroll form");

        let response = self
            .client
            .client
            .post(url)
            .headers(self.connection.headers().clone())
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        parse_response(response).await
    }
}
