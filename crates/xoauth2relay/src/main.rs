//! `xoauth2relay` - OAuth2 credential setup for the XOAUTH2 SMTP relay
//!
//! `init` stores the OAuth2 client secrets in the system keyring and
//! `login` authorizes an account, so that the relay can later authenticate
//! to the upstream SMTP server on its behalf.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod prompt;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xoauth2relay_core::{
    CredentialLifecycleManager, Error, ImportOutcome, KeyringVault, ManagerConfig,
};

use cli::{Cli, Command};
use prompt::StdinPrompt;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = default_filter(cli.verbose);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log filter used when `RUST_LOG` is unset.
const fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "xoauth2relay=info,xoauth2relay_core=info,xoauth2relay_oauth=info",
        1 => "xoauth2relay=debug,xoauth2relay_core=debug,xoauth2relay_oauth=debug",
        _ => "debug",
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = settings::load_config(cli.config.as_deref())?;
    let manager = manager(config)?;

    match cli.command {
        Command::Init {
            clientsecrets,
            force,
            delete,
        } => {
            if manager.import_client_secrets_file(&clientsecrets, force, delete)?
                == ImportOutcome::Imported
            {
                info!("Stored client secrets from {}", clientsecrets.display());
            }
        }
        Command::Login {
            email,
            force_authenticate,
            no_browser,
        } => {
            let prompt = StdinPrompt::new(!no_browser);
            let credentials = match manager
                .ensure_authenticated(&email, force_authenticate, &prompt)
                .await
            {
                Err(Error::OAuth(e)) if e.requires_reauthentication() && !force_authenticate => {
                    warn!("Stored OAuth2 token for {email} is no longer usable: {e}");
                    manager.ensure_authenticated(&email, true, &prompt).await?
                }
                result => result?,
            };
            info!(
                "OAuth2 token for {email} is valid until {}",
                credentials.token_expiry
            );
        }
    }
    Ok(())
}

fn manager(config: ManagerConfig) -> Result<CredentialLifecycleManager> {
    let vault = Arc::new(KeyringVault::new(config.keyring_service.clone()));
    Ok(CredentialLifecycleManager::new(config, vault)?)
}
