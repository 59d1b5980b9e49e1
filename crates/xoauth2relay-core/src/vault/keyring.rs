//! Vault backed by the system keyring.
//!
//! Uses the platform's native credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use tracing::{debug, warn};

use super::{SecureVault, VaultResult};

/// Service name used for keyring entries.
pub const DEFAULT_SERVICE: &str = "xoauth2relay";

/// One keyring entry per vault key, all under one service name.
#[derive(Debug, Clone)]
pub struct KeyringVault {
    service: String,
}

impl KeyringVault {
    /// Creates a vault storing entries under `service`.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Returns the keyring service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> keyring::Result<Entry> {
        Entry::new(&self.service, key)
    }
}

impl Default for KeyringVault {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl SecureVault for KeyringVault {
    fn set(&self, key: &str, secret: &[u8]) -> VaultResult<()> {
        self.entry(key)?.set_secret(secret)?;
        debug!("Stored {key} in keyring service {}", self.service);
        Ok(())
    }

    fn get(&self, key: &str) -> VaultResult<Option<Vec<u8>>> {
        match self.entry(key)?.get_secret() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => {
                debug!("No {key} in keyring service {}", self.service);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, key: &str) -> VaultResult<bool> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => {
                debug!("Deleted {key} from keyring service {}", self.service);
                Ok(true)
            }
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => {
                warn!("Failed to delete {key}: {e}");
                Err(e.into())
            }
        }
    }
}
