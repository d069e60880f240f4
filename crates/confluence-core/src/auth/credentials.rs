use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::StoreError;

/// The credential set every API call is authorized with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Epoch milliseconds. `None` for a static token with no known expiry.
    pub expires_at_ms: Option<i64>,
    pub cloud_id: String,
}

impl Credentials {
    /// True once `now + leeway` has reached the stored expiry.
    pub fn is_expired(&self, now_ms: i64, leeway_ms: i64) -> bool {
        match self.expires_at_ms {
            Some(expires_at) => expires_at <= now_ms.saturating_add(leeway_ms),
            None => false,
        }
    }

    pub fn needs_refresh(&self, leeway_ms: i64) -> bool {
        self.is_expired(Utc::now().timestamp_millis(), leeway_ms)
    }
}

/// Partial credential record. Unset fields are left untouched on merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<String>,
}

impl CredentialsUpdate {
    /// Build an update for a freshly issued token.
    ///
    /// The expiry is stamped here, at the moment the token is obtained.
    pub fn issued(access_token: String, refresh_token: Option<String>, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            access_token: Some(access_token),
            refresh_token,
            expires_at_ms: Some(now.saturating_add(expires_in_secs.saturating_mul(1000))),
            cloud_id: None,
        }
    }

    pub fn with_cloud_id(mut self, cloud_id: String) -> Self {
        self.cloud_id = Some(cloud_id);
        self
    }

    pub fn merge(&mut self, update: CredentialsUpdate) {
        if update.access_token.is_some() {
            self.access_token = update.access_token;
        }
        if update.refresh_token.is_some() {
            self.refresh_token = update.refresh_token;
        }
        if update.expires_at_ms.is_some() {
            self.expires_at_ms = update.expires_at_ms;
        }
        if update.cloud_id.is_some() {
            self.cloud_id = update.cloud_id;
        }
    }

    /// Turn the record into usable credentials, failing on missing fields.
    pub fn to_credentials(&self) -> Result<Credentials, StoreError> {
        let access_token = self
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(StoreError::Missing("ACCESS_TOKEN"))?;
        let cloud_id = self
            .cloud_id
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or(StoreError::Missing("CLOUD_ID"))?;

        Ok(Credentials {
            access_token,
            refresh_token: self.refresh_token.clone().filter(|t| !t.is_empty()),
            expires_at_ms: self.expires_at_ms,
            cloud_id,
        })
    }
}

impl From<Credentials> for CredentialsUpdate {
    fn from(creds: Credentials) -> Self {
        Self {
            access_token: Some(creds.access_token),
            refresh_token: creds.refresh_token,
            expires_at_ms: creds.expires_at_ms,
            cloud_id: Some(creds.cloud_id),
        }
    }
}

/// Persistence seam for credentials.
///
/// `set` merges into what is stored and must have persisted the result by
/// the time it returns, so a crash after a refresh never loses the newer
/// token.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Credentials, StoreError>;

    fn set(&self, update: CredentialsUpdate) -> Result<(), StoreError>;
}

/// Credentials held only in memory. Used for tests and static tokens.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    record: Mutex<CredentialsUpdate>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            record: Mutex::new(credentials.into()),
        }
    }

    /// A static bearer token that is never refreshed.
    pub fn static_token(access_token: impl Into<String>, cloud_id: impl Into<String>) -> Self {
        Self::new(Credentials {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at_ms: None,
            cloud_id: cloud_id.into(),
        })
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Credentials, StoreError> {
        let record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        record.to_credentials()
    }

    fn set(&self, update: CredentialsUpdate) -> Result<(), StoreError> {
        let mut record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        record.merge(update);
        Ok(())
    }
}
