//! Type-state authenticator for one interactive login attempt.
//!
//! ```text
//! ┌─────────┐ request_consent() ┌─────────────────┐ resume(consent) ┌────────────────────┐
//! │  Start  │ ────────────────→ │ AwaitingConsent │ ──────────────→ │ AccountCredentials │
//! └─────────┘                   └─────────────────┘                 └────────────────────┘
//! ```
//!
//! Every transition consumes the authenticator, so an attempt cannot be
//! resumed twice. There are no retries: a failed attempt is started over.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rand::RngCore;
use tracing::{debug, info};

use super::{AuthorizationCodeFlow, AuthorizationRequest, Consent, ConsentPrompt, OAuthClient};
use crate::error::{Error, Result};
use crate::registration::{ClientRegistration, ClientType};
use crate::token::AccountCredentials;

/// Redirect for installed clients that registered none: the provider shows
/// the code for the operator to paste.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Type-state marker: the attempt has not been presented yet.
#[derive(Debug)]
pub struct Start;

/// Type-state: suspended until the account holder answers the request.
#[derive(Debug)]
pub struct AwaitingConsent {
    request: AuthorizationRequest,
}

/// Interactive `OAuth2` login for one account.
#[derive(Debug)]
pub struct OAuth2Authenticator<State> {
    flow: AuthorizationCodeFlow,
    client_type: ClientType,
    email: String,
    scope: String,
    state: State,
}

impl OAuth2Authenticator<Start> {
    /// Starts an attempt to authorize `email` for `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedClientType`] if the registration is not an
    /// installed or web client, and [`Error::InvalidConfig`] for a web client
    /// without a redirect URI.
    pub fn new(
        registration: &ClientRegistration,
        email: impl Into<String>,
        scope: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        let client_type = registration.kind()?;
        let mut client = OAuthClient::from_registration(registration)?.with_http_client(http_client);

        let flow = match client_type {
            ClientType::Installed => {
                if client.redirect_uri.is_none() {
                    client.redirect_uri = Some(OOB_REDIRECT_URI.to_string());
                }
                AuthorizationCodeFlow::new(client).with_pkce()
            }
            ClientType::Web => {
                if client.redirect_uri.is_none() {
                    return Err(Error::InvalidConfig(
                        "web client registration has no redirect_uris".into(),
                    ));
                }
                AuthorizationCodeFlow::new(client)
            }
        };

        Ok(Self {
            flow,
            client_type,
            email: email.into(),
            scope: scope.into(),
            state: Start,
        })
    }

    /// Returns the flow variant of the registration.
    #[must_use]
    pub const fn client_type(&self) -> ClientType {
        self.client_type
    }

    /// Builds the consent request and suspends the attempt on it.
    #[must_use]
    pub fn request_consent(self) -> OAuth2Authenticator<AwaitingConsent> {
        let state = random_state();
        let url = self
            .flow
            .authorization_url(&self.scope, &state, Some(&self.email));
        debug!("Authorization request for {} built", self.email);

        let request = AuthorizationRequest {
            url,
            state,
            email: self.email.clone(),
            redirect_uri: self.flow.client().redirect_uri.clone(),
        };

        OAuth2Authenticator {
            flow: self.flow,
            client_type: self.client_type,
            email: self.email,
            scope: self.scope,
            state: AwaitingConsent { request },
        }
    }
}

impl OAuth2Authenticator<AwaitingConsent> {
    /// Returns the request the account holder must answer.
    #[must_use]
    pub const fn request(&self) -> &AuthorizationRequest {
        &self.state.request
    }

    /// Resumes the attempt with the account holder's answer and exchanges the
    /// code for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConsentAbandoned`] for an abandoned attempt,
    /// [`Error::AuthorizationDenied`] if the server rejects the code and
    /// [`Error::Network`] if the exchange cannot complete.
    pub async fn resume(self, consent: Consent) -> Result<AccountCredentials> {
        let Consent::Code(code) = consent else {
            return Err(Error::ConsentAbandoned);
        };

        let requested_at = Utc::now();
        let response = self.flow.exchange_code(&code).await?;
        if response.refresh_token.is_none() {
            info!(
                "No refresh token issued for {}; it will need to log in again when the token expires",
                self.email
            );
        }

        Ok(AccountCredentials::from_response(
            response,
            &self.scope,
            requested_at,
        ))
    }

    /// Presents the request through `prompt`, waits for the answer and
    /// resumes with it.
    ///
    /// # Errors
    ///
    /// See [`Self::resume`]; errors from `prompt` are returned as is.
    pub async fn authenticate<P: ConsentPrompt>(self, prompt: &P) -> Result<AccountCredentials> {
        let consent = prompt.request_consent(self.request()).await?;
        self.resume(consent).await
    }
}

fn random_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
