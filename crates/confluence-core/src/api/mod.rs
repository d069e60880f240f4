//! REST API client module for Confluence Cloud.
//!
//! This module provides the `AuthenticatedClient` and the pieces it is
//! assembled from: `RequestBuilder` (addressing and headers),
//! `RequestExecutor` (one exchange plus classification) and `Pages`
//! (content operations).
//!
//! The API uses OAuth2 bearer tokens scoped to one cloud site through the
//! `/ex/<product>/<cloudId>` path prefix.

pub mod client;
pub mod error;
pub mod executor;
pub mod pages;
pub mod query;
pub mod request;

pub use client::AuthenticatedClient;
pub use error::{ApiError, ErrorKind};
pub use executor::{ApiResponse, RequestExecutor};
pub use pages::{Pages, DEFAULT_PAGE_LIMIT};
pub use query::Comparison;
pub use request::{RequestBuilder, RequestDescriptor};
