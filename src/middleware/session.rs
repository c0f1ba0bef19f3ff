//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The cookie
//! only carries a signed reference to server-side state; the sign-in flow
//! state itself lives in the store.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::PortalConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "portal_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session store backed by `PostgreSQL`.
///
/// Call `migrate()` on the store before serving to create its table.
#[must_use]
pub fn create_session_store(pool: &PgPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
}

/// Create the session layer over a `PostgreSQL` store.
///
/// The cookie is signed with a key derived from `PORTAL_SESSION_SECRET`.
/// SameSite is Lax rather than Strict: the OAuth callback is a top-level
/// cross-site navigation and must still carry the cookie.
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &PortalConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // Production deployments sit behind HTTPS
    let is_secure = config.base_url.starts_with("https://");

    // Key derivation needs at least 32 bytes; config validation enforces that
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
