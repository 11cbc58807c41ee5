//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Login was rejected, the login transport failed, or the login
    /// response was malformed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The held credential cannot sign requests (empty secret).
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// The server returned 401 on a signed request. Distinct from transport
    /// failure so callers can prompt for re-login instead of retrying.
    #[error("Token has been revoked by the server")]
    TokenRevoked,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn auth_failed(msg: impl Into<String>) -> Self {
        Self::AuthenticationFailed(msg.into())
    }

    pub fn invalid_credential(msg: impl Into<String>) -> Self {
        Self::InvalidCredential(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map a non-2xx status on a signed request to an error.
    pub fn from_http_status(status: u16, context: impl Into<String>) -> Self {
        match status {
            401 => Self::TokenRevoked,
            404 => Self::NotFound(context.into()),
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, context.into())),
        }
    }

    /// HTTP status associated with the error, when one applies.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::TokenRevoked => Some(401),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}
