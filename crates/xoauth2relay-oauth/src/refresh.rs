//! Access token refresh.
//!
//! Refresh is reactive: callers check [`TokenRefresher::needs_refresh`] at
//! the point of use; nothing renews tokens in the background.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::flow::OAuthClient;
use crate::registration::ClientRegistration;
use crate::token::AccountCredentials;

/// Exchanges refresh tokens at a registration's token endpoint.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    client: OAuthClient,
}

impl TokenRefresher {
    /// Creates a refresher for the registration the tokens were issued to.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration's endpoints are invalid.
    pub fn new(registration: &ClientRegistration, http_client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            client: OAuthClient::from_registration(registration)?.with_http_client(http_client),
        })
    }

    /// Returns true iff `now` has reached `credentials.token_expiry`.
    #[must_use]
    pub fn needs_refresh(credentials: &AccountCredentials, now: DateTime<Utc>) -> bool {
        credentials.is_stale(now)
    }

    /// Mints a new access token.
    ///
    /// The refresh token is kept unless the server rotates it; the scope is
    /// always kept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ReauthenticationRequired`] without any network
    /// call if there is no refresh token, [`crate::Error::RefreshRejected`] if
    /// the server invalidated it and [`crate::Error::Network`] on transport
    /// failure.
    pub async fn refresh(&self, credentials: &AccountCredentials) -> Result<AccountCredentials> {
        let refresh_token = credentials.refresh_token()?;

        let requested_at = Utc::now();
        let response = self.client.refresh(refresh_token).await?;
        if response.refresh_token.is_some() {
            debug!("Authorization server rotated the refresh token");
        }

        let mut refreshed = AccountCredentials::from_response(response, &credentials.scope, requested_at);
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token.clone_from(&credentials.refresh_token);
        }
        Ok(refreshed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::Duration;

    fn stale(refresh_token: Option<&str>) -> AccountCredentials {
        AccountCredentials {
            access_token: "old".into(),
            refresh_token: refresh_token.map(str::to_string),
            token_expiry: "2020-01-01T00:00:00Z".parse().unwrap(),
            scope: "https://mail.google.com/".into(),
        }
    }

    fn refresher(server_url: &str) -> TokenRefresher {
        let raw = format!(
            r#"{{"installed":{{"client_id":"cid","client_secret":"cs","token_uri":"{server_url}/token"}}}}"#
        );
        let registration = ClientRegistration::from_slice(raw.as_bytes()).unwrap();
        TokenRefresher::new(&registration, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn test_needs_refresh_boundary() {
        let creds = stale(Some("r"));
        let expiry = creds.token_expiry;
        assert!(TokenRefresher::needs_refresh(&creds, expiry));
        assert!(TokenRefresher::needs_refresh(&creds, expiry + Duration::seconds(1)));
        assert!(!TokenRefresher::needs_refresh(&creds, expiry - Duration::seconds(1)));
    }

    #[tokio::test]
    async fn test_refresh_preserves_refresh_token_and_scope() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token":"fresh","expires_in":3599}"#)
            .expect(1)
            .create_async()
            .await;

        let refreshed = refresher(&server.url())
            .refresh(&stale(Some("r1")))
            .await
            .unwrap();

        assert_eq!(refreshed.access_token, "fresh");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("r1"));
        assert_eq!(refreshed.scope, "https://mail.google.com/");
        assert!(refreshed.token_expiry > Utc::now());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_takes_rotated_token() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token":"fresh","refresh_token":"r2","expires_in":60}"#)
            .create_async()
            .await;

        let refreshed = refresher(&server.url())
            .refresh(&stale(Some("r1")))
            .await
            .unwrap();
        assert_eq!(refreshed.refresh_token.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_missing_refresh_token_skips_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .expect(0)
            .create_async()
            .await;

        let err = refresher(&server.url())
            .refresh(&stale(None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReauthenticationRequired));
        mock.assert_async().await;
    }
}
