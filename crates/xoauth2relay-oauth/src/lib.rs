//! # xoauth2relay-oauth
//!
//! `OAuth2` pieces of the `XOAUTH2` relay: everything that talks to the
//! authorization server, nothing that stores secrets.
//!
//! ## Features
//!
//! - **Client registrations**: Google-style and flat client secrets files
//! - **Interactive login**: type-state authorization-code flow with an
//!   explicit consent suspension point, PKCE for installed clients
//! - **Token refresh**: refresh-token grant preserving the refresh token
//! - **SASL**: `XOAUTH2` initial client response
//!
//! ## Quick Start
//!
//! ```ignore
//! use xoauth2relay_oauth::{ClientRegistration, OAuth2Authenticator, TokenRefresher};
//! use xoauth2relay_oauth::flow::http_client;
//!
//! let registration = ClientRegistration::from_slice(&std::fs::read("client_secrets.json")?)?;
//! let http = http_client(std::time::Duration::from_secs(30))?;
//!
//! // Interactive login
//! let credentials = OAuth2Authenticator::new(&registration, "user@gmail.com", GMAIL_SCOPE, http.clone())?
//!     .request_consent()
//!     .authenticate(&my_prompt)
//!     .await?;
//!
//! // Later, at the point of use
//! if TokenRefresher::needs_refresh(&credentials, chrono::Utc::now()) {
//!     let credentials = TokenRefresher::new(&registration, http)?.refresh(&credentials).await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod flow;
pub mod provider;
pub mod refresh;
pub mod registration;
pub mod sasl;
pub mod token;

pub use error::{Error, Result};
pub use flow::{
    AuthorizationRequest, AwaitingConsent, Consent, ConsentPrompt, NonInteractive,
    OAuth2Authenticator, OAuthClient, Start,
};
pub use provider::{GMAIL_SCOPE, Provider};
pub use refresh::TokenRefresher;
pub use registration::{ClientInfo, ClientRegistration, ClientType};
pub use token::AccountCredentials;
