//! Secure secret storage.
//!
//! The stores only need `set` and `get` on opaque byte strings addressed by
//! a string key; [`SecureVault`] is that capability. [`KeyringVault`] backs it
//! with the platform's credential store, [`MemoryVault`] with a map.

mod keyring;
mod memory;

pub use self::keyring::{DEFAULT_SERVICE, KeyringVault};
pub use self::memory::MemoryVault;

/// Error type for vault operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Failed to access the platform keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] ::keyring::Error),

    /// The vault is unusable (e.g. a panicked writer left it inconsistent).
    #[error("Vault unavailable: {0}")]
    Unavailable(String),
}

/// Result type for vault operations.
pub type VaultResult<T> = std::result::Result<T, VaultError>;

/// Opaque key-value secret store, scoped to the current OS user.
pub trait SecureVault: Send + Sync {
    /// Stores `secret` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn set(&self, key: &str, secret: &[u8]) -> VaultResult<()>;

    /// Returns the secret under `key`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> VaultResult<Option<Vec<u8>>>;

    /// Removes the secret under `key`; returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the removal.
    fn delete(&self, key: &str) -> VaultResult<bool>;
}
