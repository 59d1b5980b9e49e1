//! # xoauth2relay-core
//!
//! Credential lifecycle for the `XOAUTH2` relay.
//!
//! This crate provides:
//! - A secure vault abstraction backed by the system keyring
//! - Client registration and account token stores
//! - The import and login flows
//! - Per-connection token lookup for the relay, with refresh serialized per
//!   account

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
mod manager;
pub mod store;
pub mod vault;

pub use config::ManagerConfig;
pub use error::{Error, Result};
pub use manager::{CredentialLifecycleManager, ImportOutcome};
pub use store::{ClientSecretsStore, CredentialsStore};
pub use vault::{KeyringVault, MemoryVault, SecureVault, VaultError};
pub use xoauth2relay_oauth::{AccountCredentials, ClientRegistration, ConsentPrompt};
