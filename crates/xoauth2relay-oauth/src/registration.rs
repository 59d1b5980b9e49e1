//! Client registrations ("client secrets" files).
//!
//! A registration is the application-level `OAuth2` identity issued by the
//! authorization server. Two layouts are accepted:
//!
//! ```text
//! {"installed": {"client_id": "...", "client_secret": "...", ...}}
//! {"type": "installed", "client_id": "...", "client_secret": "...", ...}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::provider::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, Provider};

/// `OAuth2` flow variant a registration was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    /// Desktop/CLI application; may use PKCE and the out-of-band redirect.
    Installed,
    /// Web application; must have a registered redirect URI.
    Web,
}

impl ClientType {
    /// Returns the name used in client secrets files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Web => "web",
        }
    }
}

impl FromStr for ClientType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "installed" => Ok(Self::Installed),
            "web" => Ok(Self::Web),
            other => Err(Error::UnsupportedClientType(other.to_string())),
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client id, secret and endpoints of a registration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client ID issued by the provider.
    pub client_id: String,
    /// Client secret (public installed clients may omit it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Authorization endpoint; Google's when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_uri: Option<String>,
    /// Token endpoint; Google's when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    /// Registered redirect URIs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
}

impl ClientInfo {
    /// Resolves the endpoints, defaulting to Google's.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured endpoint is not a valid URL.
    pub fn provider(&self) -> Result<Provider> {
        Provider::new(
            self.auth_uri.as_deref().unwrap_or(GOOGLE_AUTH_URL),
            self.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URL),
        )
    }
}

impl fmt::Debug for ClientInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientInfo")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .field("redirect_uris", &self.redirect_uris)
            .finish()
    }
}

/// A parsed client registration.
///
/// `client_type` is kept as written in the file; it is only checked against
/// [`ClientType`] when an authorization attempt starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRegistration {
    /// Flow variant name (`installed` or `web` for usable registrations).
    pub client_type: String,
    /// Client id, secret and endpoints.
    pub client_info: ClientInfo,
}

impl ClientRegistration {
    /// Parses a client secrets document in either supported layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the bytes are not a JSON object or
    /// do not describe a registration.
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let mut doc = parse_document(raw)?;

        let (client_type, info) = if let Some(kind) = doc.remove("type") {
            let Value::String(kind) = kind else {
                return Err(Error::MalformedInput("\"type\" must be a string".into()));
            };
            (kind, Value::Object(doc))
        } else {
            let mut sections = doc.into_iter();
            match (sections.next(), sections.next()) {
                (Some((kind, info @ Value::Object(_))), None) => (kind, info),
                _ => {
                    return Err(Error::MalformedInput(
                        "expected exactly one client type section".into(),
                    ));
                }
            }
        };

        let client_info: ClientInfo = serde_json::from_value(info)
            .map_err(|e| Error::MalformedInput(format!("{client_type} section: {e}")))?;

        Ok(Self {
            client_type,
            client_info,
        })
    }

    /// Returns the flow variant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedClientType`] for unknown variants.
    pub fn kind(&self) -> Result<ClientType> {
        self.client_type.parse()
    }
}

/// Checks that `raw` is a structured (JSON object) document.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] otherwise.
pub fn parse_document(raw: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::MalformedInput("expected a JSON object".into())),
        Err(e) => Err(Error::MalformedInput(e.to_string())),
    }
}
