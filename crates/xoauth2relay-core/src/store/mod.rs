//! Typed stores on top of the vault.
//!
//! Key namespace:
//!
//! ```text
//! {app}:client-secrets          one client registration per application
//! {app}:credentials:{email}     one token set per (application, account)
//! ```
//!
//! Application names may not contain `:`, so the two namespaces never
//! overlap and no two accounts share a key.

mod client_secrets;
mod credentials;

pub use client_secrets::ClientSecretsStore;
pub use credentials::CredentialsStore;

use crate::error::{Error, Result};

const SEPARATOR: char = ':';

/// Checks that `app_name` can be used in vault keys.
///
/// # Errors
///
/// Returns [`Error::Config`] for empty names or names containing `:`.
pub fn validate_app_name(app_name: &str) -> Result<()> {
    if app_name.is_empty() {
        return Err(Error::Config("application name is empty".into()));
    }
    if app_name.contains(SEPARATOR) {
        return Err(Error::Config(format!(
            "application name {app_name:?} must not contain '{SEPARATOR}'"
        )));
    }
    Ok(())
}

/// Vault key of an application's client registration.
#[must_use]
pub fn client_secrets_key(app_name: &str) -> String {
    format!("{app_name}{SEPARATOR}client-secrets")
}

/// Vault key of an account's tokens.
#[must_use]
pub fn credentials_key(app_name: &str, email: &str) -> String {
    format!("{app_name}{SEPARATOR}credentials{SEPARATOR}{email}")
}
