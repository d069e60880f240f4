//! Authentication: credential persistence and token refresh.
//!
//! This module provides:
//! - `CredentialStore`: the injected persistence seam, with in-memory,
//!   env-file and OS keychain implementations
//! - `TokenRefresher`: refresh-token rotation and the authorization-code
//!   exchange against the identity service
//!
//! Tokens carry an absolute expiry in epoch milliseconds, stamped when the
//! token is issued.

pub mod credentials;
pub mod env_file;
pub mod error;
pub mod keychain;
pub mod refresher;

pub use credentials::{CredentialStore, Credentials, CredentialsUpdate, MemoryCredentialStore};
pub use env_file::{EnvFile, EnvFileCredentialStore};
pub use error::{AuthError, StoreError};
pub use keychain::KeyringCredentialStore;
pub use refresher::TokenRefresher;
