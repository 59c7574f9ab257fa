//! Session middleware configuration.
//!
//! Sessions are backed by `PostgreSQL` when a database is configured and by
//! process memory in demo mode. The session only carries the visitor id.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "kc_session";

/// Session expiry after inactivity, in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over `store`.
///
/// `secure` marks the cookie HTTPS-only.
#[must_use]
pub fn create_session_layer<S>(store: S, secure: bool) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
