//! Command line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xoauth2relay", version)]
#[command(about = "Manage OAuth2 client secrets and account tokens for the XOAUTH2 relay")]
pub struct Cli {
    /// Show debug logs (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (default: <config dir>/xoauth2relay/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a client secrets file into the keyring
    Init {
        /// Client secrets file downloaded from the provider's console
        clientsecrets: PathBuf,

        /// Replace client secrets that are already stored
        #[arg(long)]
        force: bool,

        /// Delete the file once it is stored
        #[arg(long)]
        delete: bool,
    },

    /// Authorize an account and store its tokens in the keyring
    Login {
        /// Email address of the account
        email: String,

        /// Run the consent flow even if a valid token is stored
        #[arg(long)]
        force_authenticate: bool,

        /// Print the authorization URL without opening a browser
        #[arg(long)]
        no_browser: bool,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_init() {
        let cli =
            Cli::try_parse_from(["xoauth2relay", "init", "secrets.json", "--delete"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Init { force: false, delete: true, .. }
        ));
    }

    #[test]
    fn test_parse_login() {
        let cli = Cli::try_parse_from([
            "xoauth2relay",
            "-v",
            "login",
            "a@example.com",
            "--force-authenticate",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Login {
                email,
                force_authenticate,
                no_browser,
            } => {
                assert_eq!(email, "a@example.com");
                assert!(force_authenticate);
                assert!(!no_browser);
            }
            Command::Init { .. } => panic!("expected login"),
        }
    }

    #[test]
    fn test_repeated_verbose() {
        let cli = Cli::try_parse_from(["xoauth2relay", "-vv", "init", "secrets.json"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["xoauth2relay", "init", "secrets.json"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_login_requires_email() {
        assert!(Cli::try_parse_from(["xoauth2relay", "login"]).is_err());
    }
}
