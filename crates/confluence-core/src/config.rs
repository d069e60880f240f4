//! Client configuration.
//!
//! Values come from the same dotenv-style file that holds the credentials,
//! with process environment variables as a per-key fallback. Everything
//! except the OAuth client id/secret has a working default.

use std::time::Duration;

use thiserror::Error;

use crate::auth::{EnvFile, StoreError};

/// Resource API host; every content path is prefixed with `/ex/<product>/<cloudId>`.
pub const DEFAULT_API_BASE_URL: &str = "https://api.atlassian.com";

/// Identity service host serving `/oauth/token`.
pub const DEFAULT_AUTH_BASE_URL: &str = "https://auth.atlassian.com";

pub const DEFAULT_AUTHORIZATION_URL: &str = "https://auth.atlassian.com/authorize";

pub const DEFAULT_PRODUCT: &str = "confluence";

pub const DEFAULT_EXPAND: &str = "body.storage,version,space";

/// Scopes requested by the consent URL. `offline_access` is what yields a
/// refresh token.
pub const DEFAULT_SCOPES: &str = "offline_access read:confluence-content.all read:confluence-user \
read:confluence-groups write:confluence-groups write:confluence-space write:confluence-content \
write:confluence-props read:confluence-content.permission read:confluence-content.summary search:confluence";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while still failing a hung call.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub api_base_url: String,
    pub token_url: String,
    pub authorization_url: String,
    pub product: String,
    /// Default space for listings when none is given.
    pub space_key: Option<String>,
    pub default_expand: Vec<String>,
    pub scopes: String,
    pub request_timeout: Duration,
    /// How long before the real expiry a token already counts as expired.
    pub refresh_leeway: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: format!("{}/oauth/token", DEFAULT_AUTH_BASE_URL),
            authorization_url: DEFAULT_AUTHORIZATION_URL.to_string(),
            product: DEFAULT_PRODUCT.to_string(),
            space_key: None,
            default_expand: split_list(DEFAULT_EXPAND),
            scopes: DEFAULT_SCOPES.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            refresh_leeway: Duration::ZERO,
        }
    }
}

impl Config {
    /// Read the config from an env file, falling back to the process environment.
    pub fn from_env_file(file: &EnvFile) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            file.get(key)
                .map(str::to_string)
                .or_else(|| std::env::var(key).ok())
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.client_id = get("CLIENT_ID");
        config.client_secret = get("CLIENT_SECRET");
        config.redirect_uri = get("REDIRECT_URI");
        config.space_key = get("SPACE_KEY");

        if let Some(url) = get("API_BASE_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("TOKEN_URL") {
            config.token_url = url;
        } else if let Some(base) = get("AUTH_BASE_URL") {
            config.token_url = format!("{}/oauth/token", base.trim_end_matches('/'));
        }
        if let Some(url) = get("AUTHORIZATION_URL") {
            config.authorization_url = url;
        }
        if let Some(product) = get("PRODUCT") {
            config.product = product;
        }
        if let Some(expand) = get("DEFAULT_EXPAND") {
            config.default_expand = split_list(&expand);
        }
        if let Some(scopes) = get("OAUTH_SCOPES") {
            config.scopes = scopes;
        }
        if let Some(raw) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse_secs("REQUEST_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = get("TOKEN_REFRESH_LEEWAY_SECS") {
            config.refresh_leeway = Duration::from_secs(parse_secs("TOKEN_REFRESH_LEEWAY_SECS", &raw)?);
        }

        Ok(config)
    }
}

fn parse_secs(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, "https://api.atlassian.com");
        assert_eq!(config.token_url, "https://auth.atlassian.com/oauth/token");
        assert_eq!(config.product, "confluence");
        assert_eq!(config.default_expand, vec!["body.storage", "version", "space"]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_leeway, Duration::ZERO);
        assert!(config.client_id.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", " secret "),
            ("AUTH_BASE_URL", "http://localhost:9000/"),
            ("API_BASE_URL", "http://localhost:9001/"),
            ("DEFAULT_EXPAND", "version, body.storage ,"),
            ("TOKEN_REFRESH_LEEWAY_SECS", "60"),
            ("SPACE_KEY", ""),
        ]))
        .unwrap();

        assert_eq!(config.client_id.as_deref(), Some("id"));
        assert_eq!(config.client_secret.as_deref(), Some("secret"));
        assert_eq!(config.token_url, "http://localhost:9000/oauth/token");
        assert_eq!(config.api_base_url, "http://localhost:9001");
        assert_eq!(config.default_expand, vec!["version", "body.storage"]);
        assert_eq!(config.refresh_leeway, Duration::from_secs(60));
        assert!(config.space_key.is_none());
    }

    #[test]
    fn test_token_url_wins_over_auth_base() {
        let config = Config::from_lookup(lookup(&[
            ("AUTH_BASE_URL", "http://a"),
            ("TOKEN_URL", "http://b/token"),
        ]))
        .unwrap();
        assert_eq!(config.token_url, "http://b/token");
    }

    #[test]
    fn test_invalid_timeout() {
        let err = Config::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "REQUEST_TIMEOUT_SECS", .. }));
    }
}
