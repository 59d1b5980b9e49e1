//! Account credentials and token endpoint payloads.

use std::fmt;

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime assumed when a token response omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: u32 = 3600;

/// Tokens of one account, as persisted in the vault.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCredentials {
    /// Bearer token presented to the mail server.
    pub access_token: String,
    /// Long-lived token used to mint new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Instant after which `access_token` must not be used.
    pub token_expiry: DateTime<Utc>,
    /// Scope the tokens were granted for.
    pub scope: String,
}

impl AccountCredentials {
    /// Builds credentials from a token endpoint response received at `now`.
    #[must_use]
    pub fn from_response(response: TokenResponse, scope: &str, now: DateTime<Utc>) -> Self {
        let expires_in = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_expiry: now + Duration::seconds(i64::from(expires_in)),
            scope: scope.to_string(),
        }
    }

    /// Returns true once `now` has reached the expiry.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now >= self.token_expiry
    }

    /// Returns the refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReauthenticationRequired`] if none was issued.
    pub fn refresh_token(&self) -> Result<&str> {
        self.refresh_token
            .as_deref()
            .ok_or(Error::ReauthenticationRequired)
    }
}

impl fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("token_expiry", &self.token_expiry)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Token response from the `OAuth2` server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type.
    #[serde(default = "bearer")]
    pub token_type: String,
    /// Expires in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u32>,
    /// Refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn bearer() -> String {
    "Bearer".to_string()
}

/// Error response from the `OAuth2` server.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,
    /// Error description.
    #[serde(default)]
    pub error_description: String,
}

impl ErrorResponse {
    /// Parses an error body, falling back to the raw text.
    #[must_use]
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|_| Self {
            error: format!("http_{status}"),
            error_description: String::from_utf8_lossy(body).into_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn response(expires_in: Option<u32>) -> TokenResponse {
        TokenResponse {
            access_token: "ya29.access".to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_token: Some("1//refresh".to_string()),
            scope: None,
        }
    }

    #[test]
    fn test_expiry_from_response() {
        let now = Utc::now();
        let creds = AccountCredentials::from_response(response(Some(3599)), "scope", now);
        assert_eq!(creds.token_expiry, now + Duration::seconds(3599));
        assert_eq!(creds.scope, "scope");
        assert!(!creds.is_stale(now));
        assert!(creds.is_stale(now + Duration::seconds(3599)));
    }

    #[test]
    fn test_missing_expires_in_defaults() {
        let now = Utc::now();
        let creds = AccountCredentials::from_response(response(None), "scope", now);
        assert_eq!(
            creds.token_expiry,
            now + Duration::seconds(i64::from(DEFAULT_EXPIRES_IN_SECS))
        );
    }

    #[test]
    fn test_refresh_token_absent() {
        let mut creds = AccountCredentials::from_response(response(None), "scope", Utc::now());
        creds.refresh_token = None;
        assert!(matches!(
            creds.refresh_token(),
            Err(Error::ReauthenticationRequired)
        ));
    }

    #[test]
    fn test_vault_record_format() {
        let json = r#"{
            "access_token": "a",
            "refresh_token": "r",
            "token_expiry": "2020-01-01T00:00:00Z",
            "scope": "https://mail.google.com/"
        }"#;
        let creds: AccountCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.token_expiry.to_rfc3339(), "2020-01-01T00:00:00+00:00");
        assert!(!format!("{creds:?}").contains("\"a\""));
    }

    #[test]
    fn test_error_body_fallback() {
        let parsed = ErrorResponse::from_body(400, br#"{"error":"invalid_grant"}"#);
        assert_eq!(parsed.error, "invalid_grant");
        assert!(parsed.error_description.is_empty());

        let raw = ErrorResponse::from_body(502, b"Bad Gateway");
        assert_eq!(raw.error, "http_502");
        assert_eq!(raw.error_description, "Bad Gateway");
    }
}
