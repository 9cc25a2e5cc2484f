//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span, status, latency)
//! 3. Request ID (`x-request-id`)
//! 4. Security headers
//! 5. Session layer (tower-sessions over a bounded `moka` cache)
//!
//! Route protection is done per handler with the [`GatePassed`] extractor.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_store;

pub use auth::{GATE_PATH, GatePassed, SessionContext};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
pub use session_store::SessionCache;
