//! SASL `XOAUTH2` initial client response.
//!
//! This is what the relay sends after `AUTH XOAUTH2` in place of the
//! client's legacy credentials.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Generates the `XOAUTH2` initial response.
///
/// Format: `user=<user>\x01auth=Bearer <token>\x01\x01` (base64 encoded)
///
/// # Example
///
/// ```
/// use xoauth2relay_oauth::sasl::xoauth2_response;
///
/// let response = xoauth2_response("user@example.com", "ya29.a0...");
/// // Send: AUTH XOAUTH2 {response}
/// ```
#[must_use]
pub fn xoauth2_response(user: &str, token: &str) -> String {
    STANDARD.encode(format!("user={user}\x01auth=Bearer {token}\x01\x01"))
}
