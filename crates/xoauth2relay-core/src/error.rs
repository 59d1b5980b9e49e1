//! Error types for the core library.

use thiserror::Error;

use crate::vault::VaultError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Secure storage failed.
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    /// Client secrets are not a structured document.
    #[error("Malformed client secrets: {0}")]
    MalformedInput(String),

    /// No client registration imported for the application.
    #[error("Client secrets not found for {0}; import them with `xoauth2relay init`")]
    ClientSecretsNotFound(String),

    /// The account has no usable tokens and no human is available to log in.
    #[error("{0} is not authenticated; run `xoauth2relay login {0}`")]
    NotAuthenticated(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` exchange failed.
    #[error(transparent)]
    OAuth(xoauth2relay_oauth::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A refresh this caller waited on failed with a transport or storage
    /// error; carries its message.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
}

impl Error {
    /// Returns true if the account must go through an interactive login.
    #[must_use]
    pub const fn requires_reauthentication(&self) -> bool {
        match self {
            Self::NotAuthenticated(_) => true,
            Self::OAuth(e) => e.requires_reauthentication(),
            _ => false,
        }
    }
}

impl Error {
    /// Returns a copy of the error for callers that waited on the attempt
    /// that produced it.
    ///
    /// Variants holding a foreign error are copied as [`Error::RefreshFailed`]
    /// (or [`VaultError::Unavailable`]) with the same message.
    pub(crate) fn replay(&self) -> Self {
        use xoauth2relay_oauth::Error as OAuth;

        match self {
            Self::Vault(e) => Self::Vault(VaultError::Unavailable(e.to_string())),
            Self::MalformedInput(reason) => Self::MalformedInput(reason.clone()),
            Self::ClientSecretsNotFound(app) => Self::ClientSecretsNotFound(app.clone()),
            Self::NotAuthenticated(email) => Self::NotAuthenticated(email.clone()),
            Self::Config(reason) => Self::Config(reason.clone()),
            Self::RefreshFailed(reason) => Self::RefreshFailed(reason.clone()),
            Self::OAuth(e) => match e {
                OAuth::RefreshRejected { error, description } => Self::OAuth(OAuth::RefreshRejected {
                    error: error.clone(),
                    description: description.clone(),
                }),
                OAuth::ReauthenticationRequired => Self::OAuth(OAuth::ReauthenticationRequired),
                OAuth::InvalidResponse(reason) => Self::OAuth(OAuth::InvalidResponse(reason.clone())),
                OAuth::InvalidConfig(reason) => Self::OAuth(OAuth::InvalidConfig(reason.clone())),
                OAuth::UnsupportedClientType(kind) => {
                    Self::OAuth(OAuth::UnsupportedClientType(kind.clone()))
                }
                OAuth::Url(e) => Self::OAuth(OAuth::Url(*e)),
                other => Self::RefreshFailed(other.to_string()),
            },
            Self::Serde(_) | Self::Io(_) => Self::RefreshFailed(self.to_string()),
        }
    }
}

impl From<xoauth2relay_oauth::Error> for Error {
    fn from(e: xoauth2relay_oauth::Error) -> Self {
        match e {
            xoauth2relay_oauth::Error::MalformedInput(reason) => Self::MalformedInput(reason),
            other => Self::OAuth(other),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
