//! Authorization server endpoints.

use crate::error::{Error, Result};
use url::Url;

/// Google authorization endpoint, used when a registration omits `auth_uri`.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google token endpoint, used when a registration omits `token_uri`.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Full mailbox scope required for SMTP `XOAUTH2`.
pub const GMAIL_SCOPE: &str = "https://mail.google.com/";

/// Authorization server endpoints for one client registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    /// Authorization endpoint URL.
    pub auth_url: Url,
    /// Token endpoint URL.
    pub token_url: Url,
}

impl Provider {
    /// Creates a provider from explicit endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if either URL is invalid or not HTTP(S).
    pub fn new(auth_url: impl AsRef<str>, token_url: impl AsRef<str>) -> Result<Self> {
        let provider = Self {
            auth_url: Url::parse(auth_url.as_ref())?,
            token_url: Url::parse(token_url.as_ref())?,
        };
        provider.validate()?;
        Ok(provider)
    }

    /// Google `OAuth2` endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if URL parsing fails.
    pub fn google() -> Result<Self> {
        Self::new(GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL)
    }

    /// Returns true if the authorization server is Google's.
    #[must_use]
    pub fn is_google(&self) -> bool {
        self.auth_url.host_str() == Some("accounts.google.com")
    }

    /// Validates that both endpoints can carry an `OAuth2` request.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("auth_uri", &self.auth_url), ("token_uri", &self.token_url)] {
            if !matches!(url.scheme(), "https" | "http") {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be an http(s) URL, got {url}"
                )));
            }
        }
        Ok(())
    }
}
