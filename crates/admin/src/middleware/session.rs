//! Session middleware configuration for admin.
//!
//! Sessions are held in a bounded in-process [`SessionCache`]. They carry
//! only the gate state and the grant flag, both of which are cheap to lose
//! on restart.

use tower_sessions::{Expiry, SessionManagerLayer};

use super::session_store::SessionCache;
use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "catalog_admin_session";

/// Session expiry time in seconds (24 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer(
    config: &AdminConfig,
    store: SessionCache,
) -> SessionManagerLayer<SessionCache> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
