//! `OAuth2` authorization-code flow and token endpoint client.

mod authenticator;
mod code;
mod consent;
mod pkce;

pub use authenticator::{AwaitingConsent, OAuth2Authenticator, Start};
pub use code::AuthorizationCodeFlow;
pub use consent::{
    AuthorizationRequest, Consent, ConsentPrompt, NonInteractive, parse_consent_input,
};
pub use pkce::PkceChallenge;

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::registration::ClientRegistration;
use crate::token::{ErrorResponse, TokenResponse};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Builds the HTTP client used for token endpoint calls.
///
/// Every request made through it fails with [`Error::Network`] once `timeout`
/// elapses.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("xoauth2relay/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Common `OAuth2` client configuration.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// Client ID from provider.
    pub client_id: String,
    /// Client secret (optional for public clients).
    pub client_secret: Option<String>,
    /// Redirect URI for authorization code flow.
    pub redirect_uri: Option<String>,
    /// Provider configuration.
    pub provider: Provider,
    /// HTTP client.
    http_client: Client,
}

/// Outcome of a token endpoint call that reached the server.
enum TokenReply {
    Granted(TokenResponse),
    Refused(ErrorResponse),
}

impl OAuthClient {
    /// Creates a new OAuth client.
    #[must_use]
    pub fn new(client_id: impl Into<String>, provider: Provider) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            provider,
            http_client: Client::new(),
        }
    }

    /// Creates a client for a stored registration.
    ///
    /// The first registered redirect URI is used, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration's endpoints are invalid.
    pub fn from_registration(registration: &ClientRegistration) -> Result<Self> {
        let info = &registration.client_info;
        Ok(Self {
            client_id: info.client_id.clone(),
            client_secret: info.client_secret.clone(),
            redirect_uri: info.redirect_uris.first().cloned(),
            provider: info.provider()?,
            http_client: Client::new(),
        })
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Replaces the HTTP client, e.g. one built by [`http_client`].
    #[must_use]
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RefreshRejected`] if the server refuses the refresh
    /// token and [`Error::Network`] if the request cannot complete.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);

        match self.request_token(params).await? {
            TokenReply::Granted(response) => Ok(response),
            TokenReply::Refused(e) => Err(Error::RefreshRejected {
                error: e.error,
                description: e.error_description,
            }),
        }
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorizationDenied`] if the server refuses the code
    /// and [`Error::Network`] if the request cannot complete.
    pub(crate) async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenResponse> {
        let mut params = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);

        if let Some(uri) = &self.redirect_uri {
            params.insert("redirect_uri", uri);
        }

        if let Some(verifier) = code_verifier {
            params.insert("code_verifier", verifier);
        }

        match self.request_token(params).await? {
            TokenReply::Granted(response) => Ok(response),
            TokenReply::Refused(e) => Err(Error::AuthorizationDenied {
                error: e.error,
                description: e.error_description,
            }),
        }
    }

    /// POSTs a grant to the token endpoint.
    ///
    /// 4xx replies are the server refusing the grant; anything else that is
    /// not a success is reported as an invalid response.
    async fn request_token<'a>(&'a self, mut params: HashMap<&str, &'a str>) -> Result<TokenReply> {
        let grant = params.get("grant_type").copied().unwrap_or_default();
        params.insert("client_id", &self.client_id);
        if let Some(secret) = &self.client_secret {
            params.insert("client_secret", secret);
        }

        debug!("POST {} ({grant})", self.provider.token_url);
        let response = self
            .http_client
            .post(self.provider.token_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let token: TokenResponse = serde_json::from_slice(&body)
                .map_err(|e| Error::InvalidResponse(e.to_string()))?;
            debug!(
                "Token endpoint granted {grant}: expires_in={:?}, refresh_token={}",
                token.expires_in,
                token.refresh_token.is_some()
            );
            return Ok(TokenReply::Granted(token));
        }

        let error = ErrorResponse::from_body(status.as_u16(), &body);
        if status.is_client_error() {
            debug!("Token endpoint refused {grant}: {status} {}", error.error);
            Ok(TokenReply::Refused(error))
        } else {
            Err(Error::InvalidResponse(format!(
                "{status}: {} {}",
                error.error, error.error_description
            )))
        }
    }
}
