use std::sync::Mutex;

use keyring::Entry;
use tracing::debug;

use super::credentials::{CredentialStore, Credentials, CredentialsUpdate};
use super::StoreError;

const SERVICE_NAME: &str = "confluence-cli";

/// Credentials kept in the OS keychain as a single JSON record per account.
pub struct KeyringCredentialStore {
    entry: Entry,
    record: Mutex<CredentialsUpdate>,
}

impl KeyringCredentialStore {
    /// Open the keychain entry for `account`, starting empty if none exists.
    ///
    /// Every `set` writes through to the OS store, so a later `open` of the
    /// same account (in this or another process) sees the newest tokens.
    pub fn open(account: &str) -> Result<Self, StoreError> {
        debug!(account = account, "Opening keychain entry");
        Self::from_entry(Entry::new(SERVICE_NAME, account)?)
    }

    fn from_entry(entry: Entry) -> Result<Self, StoreError> {
        let record = match entry.get_password() {
            Ok(json) => serde_json::from_str(&json)?,
            Err(keyring::Error::NoEntry) => {
                debug!("No keychain entry yet");
                CredentialsUpdate::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            entry,
            record: Mutex::new(record),
        })
    }

    /// Remove the stored record from the keychain.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        *record = CredentialsUpdate::default();
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Result<Credentials, StoreError> {
        let record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        record.to_credentials()
    }

    fn set(&self, update: CredentialsUpdate) -> Result<(), StoreError> {
        let mut record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        let mut merged = record.clone();
        merged.merge(update);
        self.entry.set_password(&serde_json::to_string(&merged)?)?;
        *record = merged;
        Ok(())
    }
}
