//! Error types for `OAuth2` operations.

use std::io;

/// Result type alias for `OAuth2` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `OAuth2` error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport failure or timeout talking to the authorization server.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Client secrets are not a well-formed structured document.
    #[error("Malformed client secrets: {0}")]
    MalformedInput(String),

    /// Client registration names a flow variant we do not know.
    #[error("Unsupported client type: {0}")]
    UnsupportedClientType(String),

    /// The authorization server rejected the authorization code.
    #[error("Authorization denied: {error} - {description}")]
    AuthorizationDenied {
        /// Error code (e.g., `invalid_grant`).
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// The authorization server invalidated the refresh token.
    #[error("Refresh token rejected: {error} - {description}")]
    RefreshRejected {
        /// Error code (e.g., `invalid_grant`).
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// No refresh token available; the account must log in again.
    #[error("Re-authentication required: no refresh token available")]
    ReauthenticationRequired,

    /// The account holder abandoned the consent step.
    #[error("Authorization abandoned before a code was received")]
    ConsentAbandoned,

    /// Redirect carried a `state` that does not belong to this attempt.
    #[error("Authorization state mismatch")]
    StateMismatch,

    /// Invalid token response.
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Returns true if the only way forward is a fresh interactive login.
    #[must_use]
    pub const fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::RefreshRejected { .. } | Self::ReauthenticationRequired
        )
    }

    /// Returns true for transport failures the caller may retry.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
