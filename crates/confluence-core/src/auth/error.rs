use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing persisted credentials.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credential file: {0}")]
    Parse(String),

    #[error("Missing stored credential: {0}")]
    Missing(&'static str),

    #[error("Invalid stored value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Failed to encode credentials: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures talking to the identity service.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("No refresh token available - re-authorize to obtain one")]
    MissingRefreshToken,

    #[error("CLIENT_ID and CLIENT_SECRET must be configured")]
    MissingClientCredentials,

    #[error("Authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("No accessible site found for this token")]
    NoAccessibleResource,

    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}
