//! Import and login flows, and the relay's per-connection token lookup.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use xoauth2relay_oauth::flow::http_client;
use xoauth2relay_oauth::sasl::xoauth2_response;
use xoauth2relay_oauth::{
    AccountCredentials, ClientRegistration, ConsentPrompt, NonInteractive, OAuth2Authenticator,
    TokenRefresher,
};

use crate::config::ManagerConfig;
use crate::error::{Error, Result};
use crate::store::{ClientSecretsStore, CredentialsStore, credentials_key};
use crate::vault::SecureVault;

/// Outcome of a client secrets import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The registration was written to the vault.
    Imported,
    /// A registration already existed and `force` was not given.
    Skipped,
}

/// Serializes the refreshes of one account.
///
/// `attempts` counts finished refresh attempts. A caller that sees it change
/// while queued on `last_failure` waited on an attempt and takes its outcome:
/// the refreshed record from the vault, or a copy of the failure.
#[derive(Default)]
struct RefreshGate {
    attempts: AtomicU64,
    last_failure: Mutex<Option<Error>>,
}

/// Keeps one application's client registration and account tokens usable.
///
/// All state lives in the vault. In memory there is only a gate per account
/// with a refresh in flight, so that a stale token is refreshed by a single
/// caller while concurrent callers wait and reuse the result.
pub struct CredentialLifecycleManager {
    config: ManagerConfig,
    client_secrets: ClientSecretsStore,
    credentials: CredentialsStore,
    http_client: reqwest::Client,
    refresh_gates: Mutex<HashMap<String, Arc<RefreshGate>>>,
}

impl CredentialLifecycleManager {
    /// Creates a manager over `vault`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: ManagerConfig, vault: Arc<dyn SecureVault>) -> Result<Self> {
        config.validate()?;
        let http_client = http_client(config.http_timeout())?;
        let credentials = CredentialsStore::new(vault.clone(), config.app_name.clone())?;

        Ok(Self {
            client_secrets: ClientSecretsStore::new(vault),
            credentials,
            http_client,
            refresh_gates: Mutex::new(HashMap::new()),
            config,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Imports the application's client registration.
    ///
    /// Without `force` an existing registration is kept and
    /// [`ImportOutcome::Skipped`] returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] before any write if `raw` is not a
    /// JSON object.
    pub fn import_client_secrets(&self, raw: &[u8], force: bool) -> Result<ImportOutcome> {
        let app_name = &self.config.app_name;
        if !force && self.client_secrets.exists(app_name)? {
            warn!("Client secrets already exist; ignoring");
            return Ok(ImportOutcome::Skipped);
        }

        self.client_secrets.save(app_name, raw)?;
        info!("Client secrets saved.");
        Ok(ImportOutcome::Imported)
    }

    /// Imports the client secrets file at `path`, optionally deleting it once
    /// it is in the vault.
    ///
    /// The file is not read when the import is skipped. A failed deletion is
    /// logged and does not fail the import.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::MalformedInput`] if it is not a JSON object.
    pub fn import_client_secrets_file(
        &self,
        path: &Path,
        force: bool,
        delete: bool,
    ) -> Result<ImportOutcome> {
        if !force && self.client_secrets.exists(&self.config.app_name)? {
            warn!("Client secrets already exist; ignoring");
            return Ok(ImportOutcome::Skipped);
        }

        let raw = std::fs::read(path)?;
        let outcome = self.import_client_secrets(&raw, true)?;

        if delete {
            match std::fs::remove_file(path) {
                Ok(()) => info!("Deleted: {}", path.display()),
                Err(e) => warn!("Failed to delete {}: {e}", path.display()),
            }
        }
        Ok(outcome)
    }

    /// Returns usable credentials for `email`.
    ///
    /// Existing credentials are returned as they are while fresh, and
    /// refreshed (once, under the account's lock) when stale. Without stored
    /// credentials, with `force_reauthenticate`, or when the stored scope is
    /// not the configured one, a full login runs through `prompt`.
    ///
    /// # Errors
    ///
    /// - [`Error::ClientSecretsNotFound`] if a refresh or login is needed and
    ///   no registration was imported; no network call is made
    /// - [`Error::NotAuthenticated`] if a login is needed and `prompt` is not
    ///   interactive
    /// - [`Error::OAuth`] for refresh or login failures, including
    ///   `RefreshRejected`, which requires a forced login
    pub async fn ensure_authenticated<P: ConsentPrompt>(
        &self,
        email: &str,
        force_reauthenticate: bool,
        prompt: &P,
    ) -> Result<AccountCredentials> {
        let existing = self.credentials.load(email)?;

        if let Some(existing) = existing
            && !force_reauthenticate
        {
            if existing.scope != self.config.scope {
                info!(
                    "Stored OAuth2 token for {email} was granted {:?}, need {:?}",
                    existing.scope, self.config.scope
                );
            } else if TokenRefresher::needs_refresh(&existing, Utc::now()) {
                info!("OAuth2 token for {email} has expired.");
                return self.refresh(email).await;
            } else {
                debug!("OAuth2 token for {email} already exists.");
                return Ok(existing);
            }
        }

        self.login(email, prompt).await
    }

    /// Returns a non-expired access token for `email`, refreshing it if
    /// needed. Never starts an interactive login.
    ///
    /// # Errors
    ///
    /// See [`Self::ensure_authenticated`]; an account that has to log in
    /// yields [`Error::NotAuthenticated`].
    pub async fn get_valid_token(&self, email: &str) -> Result<String> {
        let credentials = self
            .ensure_authenticated(email, false, &NonInteractive)
            .await?;
        Ok(credentials.access_token)
    }

    /// Returns the base64 `XOAUTH2` initial response the relay sends for
    /// `email`.
    ///
    /// # Errors
    ///
    /// See [`Self::get_valid_token`].
    pub async fn xoauth2_initial_response(&self, email: &str) -> Result<String> {
        let token = self.get_valid_token(email).await?;
        Ok(xoauth2_response(email, &token))
    }

    /// Refreshes the stored token of `email` unless a concurrent caller
    /// already did, or already failed to.
    async fn refresh(&self, email: &str) -> Result<AccountCredentials> {
        let key = credentials_key(&self.config.app_name, email);
        let gate = self.acquire_gate(&key).await;
        let result = self.refresh_through(&gate, email).await;
        self.release_gate(&key, gate).await;
        result
    }

    async fn refresh_through(&self, gate: &RefreshGate, email: &str) -> Result<AccountCredentials> {
        let seen = gate.attempts.load(Ordering::Acquire);
        let mut last_failure = gate.last_failure.lock().await;

        // Re-read under the lock: whoever held it before may have refreshed.
        let Some(current) = self.credentials.load(email)? else {
            return Err(Error::NotAuthenticated(email.to_string()));
        };
        if !TokenRefresher::needs_refresh(&current, Utc::now()) {
            debug!("OAuth2 token for {email} was refreshed concurrently");
            return Ok(current);
        }
        if gate.attempts.load(Ordering::Acquire) != seen
            && let Some(failure) = last_failure.as_ref()
        {
            debug!("Concurrent refresh of {email} failed; not retrying");
            return Err(failure.replay());
        }

        let result = self.exchange_refresh_token(email, &current).await;
        *last_failure = result.as_ref().err().map(Error::replay);
        gate.attempts.fetch_add(1, Ordering::Release);
        result
    }

    async fn exchange_refresh_token(
        &self,
        email: &str,
        current: &AccountCredentials,
    ) -> Result<AccountCredentials> {
        let registration = self.registration()?;
        let refreshed = TokenRefresher::new(&registration, self.http_client.clone())?
            .refresh(current)
            .await?;
        self.credentials.save(email, &refreshed)?;
        info!("OAuth2 token for {email} has been refreshed.");
        Ok(refreshed)
    }

    /// Runs the interactive authorization-code flow and stores the result.
    async fn login<P: ConsentPrompt>(&self, email: &str, prompt: &P) -> Result<AccountCredentials> {
        let registration = self.registration()?;
        if !prompt.is_interactive() {
            return Err(Error::NotAuthenticated(email.to_string()));
        }

        info!("Starting OAuth2 authorization for {email}");
        let credentials = OAuth2Authenticator::new(
            &registration,
            email,
            self.config.scope.clone(),
            self.http_client.clone(),
        )?
        .request_consent()
        .authenticate(prompt)
        .await?;

        self.credentials.save(email, &credentials)?;
        info!("OAuth2 token saved.");
        Ok(credentials)
    }

    fn registration(&self) -> Result<ClientRegistration> {
        let app_name = &self.config.app_name;
        self.client_secrets
            .load(app_name)?
            .ok_or_else(|| Error::ClientSecretsNotFound(app_name.clone()))
    }

    async fn acquire_gate(&self, key: &str) -> Arc<RefreshGate> {
        self.refresh_gates
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Drops the gate of `key` once no caller holds it.
    async fn release_gate(&self, key: &str, gate: Arc<RefreshGate>) {
        let mut gates = self.refresh_gates.lock().await;
        drop(gate);
        if gates.get(key).is_some_and(|gate| Arc::strong_count(gate) == 1) {
            gates.remove(key);
        }
    }
}
