//! Manager configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use xoauth2relay_oauth::GMAIL_SCOPE;

use crate::error::{Error, Result};
use crate::store::validate_app_name;
use crate::vault::DEFAULT_SERVICE;

/// Application name the relay stores its secrets under.
pub const DEFAULT_APP_NAME: &str = "xoauth2relay";

/// Default timeout for token endpoint calls, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Settings passed to [`crate::CredentialLifecycleManager::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Application name; prefixes every vault key.
    pub app_name: String,
    /// Scope requested at login and required of stored tokens.
    pub scope: String,
    /// Timeout for each token endpoint request, in seconds.
    pub http_timeout_secs: u64,
    /// Keyring service name used by [`crate::vault::KeyringVault`].
    pub keyring_service: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            scope: GMAIL_SCOPE.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            keyring_service: DEFAULT_SERVICE.to_string(),
        }
    }
}

impl ManagerConfig {
    /// Returns the token endpoint timeout.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Checks the settings before use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        validate_app_name(&self.app_name)?;
        if self.scope.trim().is_empty() {
            return Err(Error::Config("scope is empty".into()));
        }
        if self.http_timeout_secs == 0 {
            return Err(Error::Config("http_timeout_secs must be positive".into()));
        }
        if self.keyring_service.is_empty() {
            return Err(Error::Config("keyring_service is empty".into()));
        }
        Ok(())
    }
}
