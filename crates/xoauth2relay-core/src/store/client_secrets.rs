//! Client registration storage.

use std::sync::Arc;

use tracing::debug;
use xoauth2relay_oauth::ClientRegistration;

use super::{client_secrets_key, validate_app_name};
use crate::error::Result;
use crate::vault::SecureVault;

/// One client registration per application name.
///
/// The imported bytes are stored verbatim once they parse as a registration,
/// and are parsed again on load.
#[derive(Clone)]
pub struct ClientSecretsStore {
    vault: Arc<dyn SecureVault>,
}

impl ClientSecretsStore {
    /// Creates a store over `vault`.
    #[must_use]
    pub fn new(vault: Arc<dyn SecureVault>) -> Self {
        Self { vault }
    }

    /// Stores `raw` as the registration of `app_name`, replacing any previous
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedInput`] without touching the vault if
    /// `raw` does not describe a registration.
    pub fn save(&self, app_name: &str, raw: &[u8]) -> Result<()> {
        validate_app_name(app_name)?;
        ClientRegistration::from_slice(raw)?;
        self.vault.set(&client_secrets_key(app_name), raw)?;
        debug!("Saved client secrets for {app_name}");
        Ok(())
    }

    /// Loads the registration of `app_name`, or `None` if none was imported.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault fails or the stored document does not
    /// describe a registration.
    pub fn load(&self, app_name: &str) -> Result<Option<ClientRegistration>> {
        validate_app_name(app_name)?;
        self.vault
            .get(&client_secrets_key(app_name))?
            .map(|raw| ClientRegistration::from_slice(&raw).map_err(Into::into))
            .transpose()
    }

    /// Returns true if a registration is stored for `app_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault fails.
    pub fn exists(&self, app_name: &str) -> Result<bool> {
        validate_app_name(app_name)?;
        Ok(self.vault.get(&client_secrets_key(app_name))?.is_some())
    }
}
