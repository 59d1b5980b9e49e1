//! The human step of the authorization-code flow.
//!
//! [`ConsentPrompt`] is the suspension point: the authenticator hands it an
//! [`AuthorizationRequest`] and waits, without timeout, for the account holder
//! to come back with a code or give up.

use std::fmt;
use std::future::Future;

use url::Url;

use crate::error::{Error, Result};

/// What the account holder has to visit to grant access.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Consent page URL.
    pub url: Url,
    /// Anti-forgery value embedded in `url`.
    pub state: String,
    /// Account being authorized.
    pub email: String,
    /// Where the provider sends the browser afterwards.
    pub redirect_uri: Option<String>,
}

/// Result of the consent step.
#[derive(Clone, PartialEq, Eq)]
pub enum Consent {
    /// One-time authorization code.
    Code(String),
    /// The account holder gave up.
    Abandoned,
}

impl fmt::Debug for Consent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(_) => f.write_str("Code(<redacted>)"),
            Self::Abandoned => f.write_str("Abandoned"),
        }
    }
}

/// Presents an authorization request to a human and waits for the outcome.
pub trait ConsentPrompt: Sync {
    /// Returns false for callers that can never involve a human, such as the
    /// relay's per-connection path.
    fn is_interactive(&self) -> bool {
        true
    }

    /// Presents `request` and resolves once a code arrives or the attempt is
    /// abandoned.
    fn request_consent(
        &self,
        request: &AuthorizationRequest,
    ) -> impl Future<Output = Result<Consent>> + Send;
}

/// Prompt for unattended callers; never obtains consent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl ConsentPrompt for NonInteractive {
    fn is_interactive(&self) -> bool {
        false
    }

    fn request_consent(
        &self,
        _request: &AuthorizationRequest,
    ) -> impl Future<Output = Result<Consent>> + Send {
        std::future::ready(Ok(Consent::Abandoned))
    }
}

/// Interprets what an operator pasted back: a bare code, or the whole
/// redirect URL.
///
/// Empty input abandons the attempt.
///
/// # Errors
///
/// Returns [`Error::StateMismatch`] if a pasted redirect belongs to another
/// attempt and [`Error::AuthorizationDenied`] if it carries an `error`.
pub fn parse_consent_input(input: &str, expected_state: &str) -> Result<Consent> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Consent::Abandoned);
    }

    let url = match Url::parse(input) {
        Ok(url) if url.query().is_some() => url,
        _ => return Ok(Consent::Code(input.to_string())),
    };

    let (mut code, mut state, mut error, mut description) = (None, None, None, None);
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }

    if state.as_deref().is_some_and(|s| s != expected_state) {
        return Err(Error::StateMismatch);
    }
    if let Some(error) = error {
        return Err(Error::AuthorizationDenied {
            error,
            description: description.unwrap_or_default(),
        });
    }
    code.map(Consent::Code)
        .ok_or_else(|| Error::InvalidResponse("redirect URL carries no code".into()))
}
