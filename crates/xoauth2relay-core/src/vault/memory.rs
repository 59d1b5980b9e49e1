//! In-process vault.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{SecureVault, VaultError, VaultResult};

/// Map-backed vault for tests and for embedders that persist secrets
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryVault {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the full contents, for comparing vault state across calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault lock is poisoned.
    pub fn snapshot(&self) -> VaultResult<BTreeMap<String, Vec<u8>>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> VaultResult<MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| VaultError::Unavailable("memory vault lock poisoned".into()))
    }
}

impl SecureVault for MemoryVault {
    fn set(&self, key: &str, secret: &[u8]) -> VaultResult<()> {
        self.lock()?.insert(key.to_string(), secret.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> VaultResult<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> VaultResult<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let vault = MemoryVault::new();
        vault.set("k", b"one").unwrap();
        vault.set("k", b"two").unwrap();
        assert_eq!(vault.get("k").unwrap().as_deref(), Some(&b"two"[..]));
        assert_eq!(vault.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_key() {
        let vault = MemoryVault::new();
        assert_eq!(vault.get("absent").unwrap(), None);
        assert!(!vault.delete("absent").unwrap());
    }
}
