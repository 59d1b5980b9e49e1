//! Account token storage.

use std::sync::Arc;

use tracing::debug;
use xoauth2relay_oauth::AccountCredentials;

use super::{credentials_key, validate_app_name};
use crate::error::Result;
use crate::vault::SecureVault;

/// One [`AccountCredentials`] record per account of a fixed application.
#[derive(Clone)]
pub struct CredentialsStore {
    vault: Arc<dyn SecureVault>,
    app_name: String,
}

impl CredentialsStore {
    /// Creates a store for the accounts of `app_name`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if `app_name` cannot be used in keys.
    pub fn new(vault: Arc<dyn SecureVault>, app_name: impl Into<String>) -> Result<Self> {
        let app_name = app_name.into();
        validate_app_name(&app_name)?;
        Ok(Self { vault, app_name })
    }

    /// Stores `credentials` for `email`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the vault write fails.
    pub fn save(&self, email: &str, credentials: &AccountCredentials) -> Result<()> {
        let record = serde_json::to_vec(credentials)?;
        self.vault
            .set(&credentials_key(&self.app_name, email), &record)?;
        debug!(
            "Saved OAuth2 token for {email} (expires {})",
            credentials.token_expiry
        );
        Ok(())
    }

    /// Loads the record for `email`, or `None` if the account never logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault fails or the record is corrupt.
    pub fn load(&self, email: &str) -> Result<Option<AccountCredentials>> {
        let Some(record) = self.vault.get(&credentials_key(&self.app_name, email))? else {
            debug!("No OAuth2 token stored for {email}");
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&record)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::vault::MemoryVault;
    use chrono::{Duration, Utc};

    fn credentials(access_token: &str) -> AccountCredentials {
        AccountCredentials {
            access_token: access_token.into(),
            refresh_token: Some("refresh".into()),
            token_expiry: Utc::now() + Duration::hours(1),
            scope: "https://mail.google.com/".into(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let store = CredentialsStore::new(Arc::new(MemoryVault::new()), "xoauth2relay").unwrap();
        let saved = credentials("a1");
        store.save("a@example.com", &saved).unwrap();

        assert_eq!(store.load("a@example.com").unwrap(), Some(saved));
        assert_eq!(store.load("b@example.com").unwrap(), None);
    }

    #[test]
    fn test_save_overwrites() {
        let store = CredentialsStore::new(Arc::new(MemoryVault::new()), "app").unwrap();
        store.save("a@example.com", &credentials("first")).unwrap();
        store.save("a@example.com", &credentials("second")).unwrap();
        assert_eq!(
            store.load("a@example.com").unwrap().unwrap().access_token,
            "second"
        );
    }

    #[test]
    fn test_accounts_scoped_by_application() {
        let vault: Arc<dyn SecureVault> = Arc::new(MemoryVault::new());
        let one = CredentialsStore::new(vault.clone(), "one").unwrap();
        let two = CredentialsStore::new(vault, "two").unwrap();

        one.save("a@example.com", &credentials("a1")).unwrap();
        assert!(two.load("a@example.com").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_record() {
        let vault = Arc::new(MemoryVault::new());
        vault
            .set(&credentials_key("app", "a@example.com"), b"not json")
            .unwrap();
        let store = CredentialsStore::new(vault, "app").unwrap();
        assert!(matches!(store.load("a@example.com"), Err(Error::Serde(_))));
    }

    #[test]
    fn test_rejects_bad_app_name() {
        let result = CredentialsStore::new(Arc::new(MemoryVault::new()), "bad:name");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
