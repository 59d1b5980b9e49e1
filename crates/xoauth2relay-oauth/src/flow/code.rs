//! Authorization Code Flow implementation.

use super::{OAuthClient, PkceChallenge};
use crate::error::Result;
use crate::token::TokenResponse;
use url::Url;

/// Authorization Code Flow for `OAuth2`.
///
/// Builds the consent URL and exchanges the code the account holder brings
/// back for tokens.
#[derive(Debug)]
pub struct AuthorizationCodeFlow {
    client: OAuthClient,
    pkce: Option<PkceChallenge>,
}

impl AuthorizationCodeFlow {
    /// Creates a new authorization code flow.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self { client, pkce: None }
    }

    /// Enables PKCE (used for installed clients).
    #[must_use]
    pub fn with_pkce(mut self) -> Self {
        self.pkce = Some(PkceChallenge::generate());
        self
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &OAuthClient {
        &self.client
    }

    /// Builds the authorization URL for user consent.
    ///
    /// # Arguments
    ///
    /// * `scope` - Space separated scopes to request
    /// * `state` - Opaque value echoed back in the redirect
    /// * `login_hint` - Account the consent screen should preselect
    #[must_use]
    pub fn authorization_url(&self, scope: &str, state: &str, login_hint: Option<&str>) -> Url {
        let mut url = self.client.provider.auth_url.clone();

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", &self.client.client_id)
                .append_pair("response_type", "code")
                .append_pair("scope", scope)
                .append_pair("state", state);

            if let Some(redirect_uri) = &self.client.redirect_uri {
                pairs.append_pair("redirect_uri", redirect_uri);
            }

            if let Some(hint) = login_hint {
                pairs.append_pair("login_hint", hint);
            }

            if let Some(pkce) = &self.pkce {
                pairs
                    .append_pair("code_challenge", pkce.challenge())
                    .append_pair("code_challenge_method", pkce.method());
            }

            // Google only issues a refresh token for offline access.
            if self.client.provider.is_google() {
                pairs
                    .append_pair("access_type", "offline")
                    .append_pair("prompt", "consent");
            }
        }

        url
    }

    /// Exchanges the authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let code_verifier = self.pkce.as_ref().map(PkceChallenge::verifier);
        self.client.exchange_code(code, code_verifier).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    fn google_client() -> OAuthClient {
        OAuthClient::new("test_client", Provider::google().unwrap())
    }

    #[test]
    fn test_authorization_url() {
        let client = google_client().with_redirect_uri("http://localhost:8080");
        let flow = AuthorizationCodeFlow::new(client);
        let url = flow.authorization_url(
            "https://mail.google.com/",
            "random_state",
            Some("a@example.com"),
        );

        let query = url.as_str();
        assert!(query.contains("client_id=test_client"));
        assert!(query.contains("response_type=code"));
        assert!(query.contains("state=random_state"));
        assert!(query.contains("scope=https%3A%2F%2Fmail.google.com%2F"));
        assert!(query.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080"));
        assert!(query.contains("login_hint=a%40example.com"));
        assert!(query.contains("access_type=offline"));
        assert!(query.contains("prompt=consent"));
        assert!(!query.contains("code_challenge"));
    }

    #[test]
    fn test_authorization_url_with_pkce() {
        let flow = AuthorizationCodeFlow::new(google_client()).with_pkce();
        let url = flow.authorization_url("email", "s", None);

        assert!(url.as_str().contains("code_challenge="));
        assert!(url.as_str().contains("code_challenge_method=S256"));
        assert!(!url.as_str().contains("login_hint"));
    }

    #[test]
    fn test_non_google_has_no_offline_params() {
        let provider = Provider::new(
            "https://auth.example.com/authorize",
            "https://auth.example.com/token",
        )
        .unwrap();
        let flow = AuthorizationCodeFlow::new(OAuthClient::new("c", provider));
        let url = flow.authorization_url("mail", "s", None);

        assert!(url.as_str().starts_with("https://auth.example.com/authorize?"));
        assert!(!url.as_str().contains("access_type"));
    }
}
