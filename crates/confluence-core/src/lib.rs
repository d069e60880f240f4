//! Core library for the `confluence` command-line client.
//!
//! The authenticated request pipeline lives in [`api`]: every call checks the
//! stored token's expiry, builds a tenant-scoped request, classifies the
//! response into [`api::ApiResponse`] or a typed [`api::ApiError`], and
//! retries exactly once after refreshing when the server answers 401.
//!
//! Credentials are never global: a [`auth::CredentialStore`] is injected into
//! the client and is the only place tokens are read from or written to.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiError, ApiResponse, AuthenticatedClient, Comparison, ErrorKind, Pages};
pub use auth::{
    AuthError, CredentialStore, Credentials, CredentialsUpdate, EnvFile, EnvFileCredentialStore,
    KeyringCredentialStore, MemoryCredentialStore, StoreError, TokenRefresher,
};
pub use config::{Config, ConfigError};
pub use models::{AccessibleResource, Page};
