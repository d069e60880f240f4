//! Token lifecycle against the identity service.
//!
//! Handles:
//! - Refresh-token rotation (`grant_type=refresh_token`)
//! - Authorization-code exchange (`grant_type=authorization_code`)
//! - Consent URL construction
//! - Accessible-resource lookup, which yields the cloud id

use std::sync::Arc;

use rand::RngCore;
use reqwest::{header, Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::credentials::{CredentialStore, Credentials, CredentialsUpdate};
use super::AuthError;
use crate::api::ApiError;
use crate::config::Config;
use crate::models::AccessibleResource;

#[derive(Debug, Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
enum TokenRequest<'a> {
    RefreshToken {
        client_id: &'a str,
        client_secret: &'a str,
        refresh_token: &'a str,
    },
    AuthorizationCode {
        client_id: &'a str,
        client_secret: &'a str,
        code: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        redirect_uri: Option<&'a str>,
    },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Clone is cheap - the reqwest client and store are shared.
#[derive(Clone)]
pub struct TokenRefresher {
    client: Client,
    store: Arc<dyn CredentialStore>,
    token_url: String,
    authorization_url: String,
    accessible_resources_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    scopes: String,
}

impl TokenRefresher {
    pub fn new(client: Client, store: Arc<dyn CredentialStore>, config: &Config) -> Self {
        Self {
            client,
            store,
            token_url: config.token_url.clone(),
            authorization_url: config.authorization_url.clone(),
            accessible_resources_url: format!(
                "{}/oauth/token/accessible-resources",
                config.api_base_url.trim_end_matches('/')
            ),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
        }
    }

    fn client_credentials(&self) -> Result<(&str, &str), AuthError> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(AuthError::MissingClientCredentials),
        }
    }

    /// Exchange the stored refresh token for a new access token and persist it.
    ///
    /// Does not retry; any failure is returned to the caller as-is.
    pub async fn refresh(&self) -> Result<Credentials, AuthError> {
        let current = self.store.get()?;
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or(AuthError::MissingRefreshToken)?;
        let (client_id, client_secret) = self.client_credentials()?;

        let request = TokenRequest::RefreshToken {
            client_id,
            client_secret,
            refresh_token,
        };
        let tokens = self
            .request_tokens(&request)
            .await
            .map_err(AuthError::RefreshFailed)?;

        let update = CredentialsUpdate::issued(tokens.access_token, tokens.refresh_token, tokens.expires_in);
        self.store.set(update)?;
        info!(expires_in = tokens.expires_in, "Access token refreshed");

        Ok(self.store.get()?)
    }

    /// Trade an authorization code for tokens, resolve the cloud id from the
    /// first accessible site, and persist everything.
    pub async fn exchange_code(&self, code: &str) -> Result<Credentials, AuthError> {
        let (client_id, client_secret) = self.client_credentials()?;
        let request = TokenRequest::AuthorizationCode {
            client_id,
            client_secret,
            code,
            redirect_uri: self.redirect_uri.as_deref(),
        };
        let tokens = self
            .request_tokens(&request)
            .await
            .map_err(AuthError::ExchangeFailed)?;

        let resources = self
            .accessible_resources(&tokens.access_token)
            .await
            .map_err(|e| AuthError::ExchangeFailed(format!("failed to list accessible sites: {}", e)))?;
        let site = resources.into_iter().next().ok_or(AuthError::NoAccessibleResource)?;
        info!(site = %site.name, cloud_id = %site.id, "Authorized site");

        let update = CredentialsUpdate::issued(tokens.access_token, tokens.refresh_token, tokens.expires_in)
            .with_cloud_id(site.id);
        self.store.set(update)?;
        Ok(self.store.get()?)
    }

    /// Sites the given access token can reach.
    pub async fn accessible_resources(&self, access_token: &str) -> Result<Vec<AccessibleResource>, ApiError> {
        let response = self
            .client
            .get(&self.accessible_resources_url)
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Consent page URL the user opens to grant access.
    pub fn authorization_url(&self, state: &str) -> Result<Url, AuthError> {
        let client_id = self.client_id.as_deref().ok_or(AuthError::MissingClientCredentials)?;
        let mut url = Url::parse(&self.authorization_url)
            .map_err(|e| AuthError::ExchangeFailed(format!("invalid authorization URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("audience", "api.atlassian.com")
                .append_pair("client_id", client_id)
                .append_pair("scope", &self.scopes);
            if let Some(ref redirect) = self.redirect_uri {
                query.append_pair("redirect_uri", redirect);
            }
            query
                .append_pair("state", state)
                .append_pair("response_type", "code")
                .append_pair("prompt", "consent");
        }
        Ok(url)
    }

    /// Random value for the `state` parameter, as 32 hex characters.
    pub fn generate_state() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// POST to the token endpoint. Errors are rendered to a message string;
    /// the caller picks the `AuthError` variant.
    async fn request_tokens(&self, request: &TokenRequest<'_>) -> Result<TokenResponse, String> {
        debug!(url = %self.token_url, "Requesting tokens");
        let response = self
            .client
            .post(&self.token_url)
            .json(request)
            .send()
            .await
            .map_err(|e| format!("request to identity service failed: {}", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read identity service response: {}", e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or_else(|| ApiError::truncate_body(&body));
            warn!(status = status.as_u16(), "Identity service rejected token request");
            return Err(format!("status {}: {}", status.as_u16(), detail));
        }

        serde_json::from_str(&body).map_err(|e| format!("unparsable token response: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;

    fn refresher(config: Config) -> TokenRefresher {
        let store = Arc::new(MemoryCredentialStore::static_token("a", "c"));
        TokenRefresher::new(Client::new(), store, &config)
    }

    #[test]
    fn test_token_request_shape() {
        let body = serde_json::to_value(TokenRequest::RefreshToken {
            client_id: "id",
            client_secret: "secret",
            refresh_token: "r",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "grant_type": "refresh_token",
                "client_id": "id",
                "client_secret": "secret",
                "refresh_token": "r"
            })
        );

        let body = serde_json::to_value(TokenRequest::AuthorizationCode {
            client_id: "id",
            client_secret: "secret",
            code: "abc",
            redirect_uri: None,
        })
        .unwrap();
        assert_eq!(body["grant_type"], "authorization_code");
        assert!(body.get("redirect_uri").is_none());
    }

    #[test]
    fn test_authorization_url() {
        let config = Config {
            client_id: Some("my-client".to_string()),
            redirect_uri: Some("http://localhost:8080/oauth/callback".to_string()),
            scopes: "offline_access read:confluence-content.all".to_string(),
            ..Config::default()
        };
        let url = refresher(config).authorization_url("state-1").unwrap();

        assert_eq!(url.host_str(), Some("auth.atlassian.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".to_string(), "my-client".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "offline_access read:confluence-content.all".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:8080/oauth/callback".to_string()
        )));
        assert!(pairs.contains(&("state".to_string(), "state-1".to_string())));
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
    }

    #[test]
    fn test_authorization_url_requires_client_id() {
        let err = refresher(Config::default()).authorization_url("s").unwrap_err();
        assert!(matches!(err, AuthError::MissingClientCredentials));
    }

    #[test]
    fn test_generate_state() {
        let a = TokenRefresher::generate_state();
        let b = TokenRefresher::generate_state();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_fails_fast() {
        let config = Config {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            token_url: "http://127.0.0.1:1/oauth/token".to_string(),
            ..Config::default()
        };
        let err = refresher(config).refresh().await.unwrap_err();
        assert!(matches!(err, AuthError::MissingRefreshToken));
    }
}
