//! Dotenv-format key-value file, and the credential store built on it.
//!
//! The file is parsed with `dotenvy` so it stays compatible with anything
//! else that loads it. Writes preserve key order and unrelated keys.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::credentials::{CredentialStore, Credentials, CredentialsUpdate};
use super::StoreError;

const ACCESS_TOKEN_KEY: &str = "ACCESS_TOKEN";
const REFRESH_TOKEN_KEY: &str = "REFRESH_TOKEN";
const EXPIRES_AT_KEY: &str = "TOKEN_EXPIRATION_TIME";
const CLOUD_ID_KEY: &str = "CLOUD_ID";

#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Load the file, treating a missing file as empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut file = Self {
            path,
            entries: Vec::new(),
        };
        if !file.path.exists() {
            debug!(path = %file.path.display(), "Env file not found, starting empty");
            return Ok(file);
        }

        let iter = dotenvy::from_path_iter(&file.path).map_err(|e| StoreError::Parse(e.to_string()))?;
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Parse(e.to_string()))?;
            file.upsert(key, value);
        }
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.upsert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    /// Write the file through a temporary sibling and rename it into place.
    pub fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut contents = String::new();
        for (key, value) in &self.entries {
            contents.push_str(key);
            contents.push('=');
            contents.push_str(&quote_value(value));
            contents.push('\n');
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn upsert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// Quote a value so `dotenvy` reads it back verbatim.
fn quote_value(value: &str) -> String {
    let plain = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | ',' | '+' | '@'));
    if plain && !value.is_empty() {
        return value.to_string();
    }
    if !value.contains('\'') {
        return format!("'{}'", value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' | '$' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Credentials persisted in the same env file as the rest of the config.
#[derive(Debug)]
pub struct EnvFileCredentialStore {
    file: Mutex<EnvFile>,
}

impl EnvFileCredentialStore {
    pub fn new(file: EnvFile) -> Self {
        Self {
            file: Mutex::new(file),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self::new(EnvFile::load(path)?))
    }

    fn record(file: &EnvFile) -> Result<CredentialsUpdate, StoreError> {
        let expires_at_ms = match file.get(EXPIRES_AT_KEY).filter(|v| !v.is_empty()) {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| StoreError::InvalidValue {
                key: EXPIRES_AT_KEY,
                value: raw.to_string(),
            })?),
            None => None,
        };

        Ok(CredentialsUpdate {
            access_token: file.get(ACCESS_TOKEN_KEY).map(str::to_string),
            refresh_token: file.get(REFRESH_TOKEN_KEY).map(str::to_string),
            expires_at_ms,
            cloud_id: file.get(CLOUD_ID_KEY).map(str::to_string),
        })
    }
}

impl CredentialStore for EnvFileCredentialStore {
    fn get(&self) -> Result<Credentials, StoreError> {
        let file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        Self::record(&file)?.to_credentials()
    }

    fn set(&self, update: CredentialsUpdate) -> Result<(), StoreError> {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = update.access_token {
            file.set(ACCESS_TOKEN_KEY, token);
        }
        if let Some(token) = update.refresh_token {
            file.set(REFRESH_TOKEN_KEY, token);
        }
        if let Some(expires_at) = update.expires_at_ms {
            file.set(EXPIRES_AT_KEY, expires_at.to_string());
        }
        if let Some(cloud_id) = update.cloud_id {
            file.set(CLOUD_ID_KEY, cloud_id);
        }
        file.save()?;
        debug!(path = %file.path().display(), "Persisted credentials");
        Ok(())
    }
}
