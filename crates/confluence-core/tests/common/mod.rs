#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use confluence_core::{AuthenticatedClient, Config, Credentials, MemoryCredentialStore};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLOUD_ID: &str = "cloud-123";
pub const CONTENT: &str = "/ex/confluence/cloud-123/wiki/rest/api/content";
pub const SEARCH: &str = "/ex/confluence/cloud-123/wiki/rest/api/content/search";
pub const TOKEN: &str = "/oauth/token";

pub fn config(server: &MockServer) -> Config {
    Config {
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        api_base_url: server.uri(),
        token_url: format!("{}{}", server.uri(), TOKEN),
        default_expand: vec!["body.storage".to_string(), "version".to_string()],
        ..Config::default()
    }
}

pub fn in_an_hour() -> i64 {
    Utc::now().timestamp_millis() + 3_600_000
}

pub fn an_hour_ago() -> i64 {
    Utc::now().timestamp_millis() - 3_600_000
}

pub fn store(access_token: &str, expires_at_ms: Option<i64>) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::new(Credentials {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh-1".to_string()),
        expires_at_ms,
        cloud_id: CLOUD_ID.to_string(),
    }))
}

pub fn client(server: &MockServer, store: Arc<MemoryCredentialStore>) -> AuthenticatedClient {
    AuthenticatedClient::new(&config(server), store).expect("client should build")
}

/// Identity endpoint that rotates to `new_token` / `refresh-2`.
pub async fn mount_refresh(server: &MockServer, new_token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "client_id": "client-id",
            "client_secret": "client-secret",
            "refresh_token": "refresh-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": new_token,
            "refresh_token": "refresh-2",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub fn page_json(id: &str, version: u64, title: &str, body: &str) -> Value {
    json!({
        "id": id,
        "type": "page",
        "status": "current",
        "title": title,
        "version": {"number": version},
        "body": {"storage": {"value": body, "representation": "storage"}}
    })
}

pub fn listing(pages: Vec<Value>) -> Value {
    let size = pages.len();
    json!({"results": pages, "start": 0, "limit": 25, "size": size})
}
