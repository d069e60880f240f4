//! Authenticated client for the Confluence Cloud REST API.
//!
//! `AuthenticatedClient::call` is the single entry point every content
//! operation goes through:
//!
//! 1. If the stored token has expired, refresh it before anything else.
//! 2. Build the request from the current credentials and execute it once.
//! 3. On 401 only, refresh once, rebuild the request and execute again.
//!
//! Nothing else is retried. A refresh failure ends the call.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::executor::{ApiResponse, RequestExecutor};
use super::pages::Pages;
use super::request::RequestBuilder;
use super::ApiError;
use crate::auth::{CredentialStore, Credentials, TokenRefresher};
use crate::config::Config;
use crate::models::AccessibleResource;

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthenticatedClient {
    store: Arc<dyn CredentialStore>,
    refresher: TokenRefresher,
    builder: RequestBuilder,
    executor: RequestExecutor,
    refresh_leeway_ms: i64,
    expand: Vec<String>,
}

impl AuthenticatedClient {
    /// Create a client sharing one connection pool between API and token calls.
    pub fn new(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_http_client(config, store, http))
    }

    pub fn with_http_client(config: &Config, store: Arc<dyn CredentialStore>, http: Client) -> Self {
        Self {
            refresher: TokenRefresher::new(http.clone(), store.clone(), config),
            builder: RequestBuilder::new(&config.api_base_url, &config.product),
            executor: RequestExecutor::new(http),
            refresh_leeway_ms: i64::try_from(config.refresh_leeway.as_millis()).unwrap_or(i64::MAX),
            expand: config.default_expand.clone(),
            store,
        }
    }

    pub fn refresher(&self) -> &TokenRefresher {
        &self.refresher
    }

    /// Page operations built on this client.
    pub fn pages(&self) -> Pages<'_> {
        Pages::new(self, &self.expand)
    }

    /// Make an API call, refreshing credentials transparently.
    pub async fn call(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
        headers: &HeaderMap,
    ) -> Result<ApiResponse, ApiError> {
        let credentials = self.current_credentials().await?;

        let request = self.builder.build(&credentials, path, method.clone(), headers)?;
        debug!(method = %request.method, url = %request.url, "API request");

        match self.executor.execute(&request, body).await {
            Err(ApiError::Unauthorized) => {
                warn!(path = path, "Token rejected, refreshing and retrying once");
                let refreshed = self.refresher.refresh().await?;
                let retry = self.builder.build(&refreshed, path, method, headers)?;
                self.executor.execute(&retry, body).await
            }
            result => result,
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.call(path, Method::GET, None, &HeaderMap::new()).await
    }

    /// Sites reachable with the current token (not tenant-scoped).
    pub async fn accessible_resources(&self) -> Result<Vec<AccessibleResource>, ApiError> {
        let credentials = self.current_credentials().await?;
        match self.refresher.accessible_resources(&credentials.access_token).await {
            Err(ApiError::Unauthorized) => {
                warn!("Token rejected, refreshing and retrying once");
                let refreshed = self.refresher.refresh().await?;
                self.refresher.accessible_resources(&refreshed.access_token).await
            }
            result => result,
        }
    }

    /// Stored credentials, refreshed first when they have expired.
    async fn current_credentials(&self) -> Result<Credentials, ApiError> {
        let credentials = self.store.get()?;
        if credentials.needs_refresh(self.refresh_leeway_ms) {
            info!("Access token expired, refreshing before request");
            return Ok(self.refresher.refresh().await?);
        }
        Ok(credentials)
    }
}
