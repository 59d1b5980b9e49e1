//! Terminal consent prompt.

use std::future::Future;
use std::io::{self, BufRead, Write};

use tracing::warn;
use xoauth2relay_oauth::flow::parse_consent_input;
use xoauth2relay_oauth::{AuthorizationRequest, Consent, ConsentPrompt, Error, Result};

/// Shows the authorization URL, opens it in a browser and reads the
/// authorization code (or the whole redirect URL) from standard input.
///
/// An empty line or end of input abandons the login.
#[derive(Debug, Clone, Copy)]
pub struct StdinPrompt {
    open_browser: bool,
}

impl StdinPrompt {
    pub const fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

impl ConsentPrompt for StdinPrompt {
    fn request_consent(
        &self,
        request: &AuthorizationRequest,
    ) -> impl Future<Output = Result<Consent>> + Send {
        let url = request.url.to_string();
        let state = request.state.clone();
        let email = request.email.clone();
        let open_browser = self.open_browser;

        async move {
            println!("Authorize {email} by visiting:\n\n    {url}\n");
            if open_browser && let Err(e) = opener::open(&url) {
                warn!("Could not open a browser: {e}");
            }

            let line = tokio::task::spawn_blocking(read_code)
                .await
                .map_err(|e| Error::Io(io::Error::other(e)))??;
            parse_consent_input(&line, &state)
        }
    }
}

fn read_code() -> io::Result<String> {
    print!("Enter the authorization code or the redirected URL: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
