use thiserror::Error;

use crate::auth::{AuthError, StoreError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unauthorized - token was rejected")]
    Unauthorized,

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Page {0} has no version information")]
    VersionMissing(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Flat classification of an `ApiError`, for callers that branch on the
/// failure category rather than the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    MalformedResponse,
    Unauthorized,
    RequestFailed,
    RefreshFailed,
    NotFound,
    VersionMissing,
    InvalidRequest,
    Credentials,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            code => ApiError::RequestFailed {
                status: code,
                message: Self::truncate_body(body),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::RequestFailed { .. } => ErrorKind::RequestFailed,
            ApiError::Auth(AuthError::Store(_)) => ErrorKind::Credentials,
            ApiError::Auth(_) => ErrorKind::RefreshFailed,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::VersionMissing(_) => ErrorKind::VersionMissing,
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Upstream HTTP status, when the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::RequestFailed { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Auth(AuthError::Store(err))
    }
}
