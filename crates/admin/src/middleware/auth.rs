//! Session context and gate extractors for admin.
//!
//! Handlers never touch session keys directly; they go through
//! [`SessionContext`], and protected pages take [`GatePassed`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::gate::Gate;
use crate::models::session_keys;

/// Where unauthenticated requests are sent.
pub const GATE_PATH: &str = "/auth/gate";

/// Per-request view of the browser session.
#[derive(Debug, Clone)]
pub struct SessionContext(Session);

/// Rejection when the session layer is not installed.
#[derive(Debug)]
pub struct MissingSession;

impl IntoResponse for MissingSession {
    fn into_response(self) -> Response {
        tracing::error!("Session layer missing from router");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = MissingSession;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or(MissingSession)
    }
}

impl SessionContext {
    /// Whether the gate has been passed in this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn is_authenticated(&self) -> Result<bool, tower_sessions::session::Error> {
        Ok(self
            .0
            .get::<bool>(session_keys::AUTHENTICATED)
            .await?
            .unwrap_or(false))
    }

    /// Mark the session as authenticated and drop the finished gate.
    ///
    /// The session id is rotated on the way.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn grant(&self) -> Result<(), tower_sessions::session::Error> {
        self.0.cycle_id().await?;
        self.0.remove_value(session_keys::GATE).await?;
        self.0.insert(session_keys::AUTHENTICATED, true).await
    }

    /// End the session (logout). Its record is deleted from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot delete the record.
    pub async fn revoke(&self) -> Result<(), tower_sessions::session::Error> {
        self.0.flush().await
    }

    /// The in-progress gate, if one was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or the stored gate
    /// does not deserialize.
    pub async fn load_gate(&self) -> Result<Option<Gate>, tower_sessions::session::Error> {
        self.0.get(session_keys::GATE).await
    }

    /// Persist the gate for the next request.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn store_gate(&self, gate: &Gate) -> Result<(), tower_sessions::session::Error> {
        self.0.insert(session_keys::GATE, gate).await
    }
}

/// Extractor that requires a passed gate.
///
/// Unauthenticated requests are redirected to the gate page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_: GatePassed) -> impl IntoResponse {
///     "inside"
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GatePassed;

/// Rejection for [`GatePassed`].
#[derive(Debug)]
pub struct RedirectToGate;

impl IntoResponse for RedirectToGate {
    fn into_response(self) -> Response {
        Redirect::to(GATE_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for GatePassed
where
    S: Send + Sync,
{
    type Rejection = RedirectToGate;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionContext::from_request_parts(parts, state)
            .await
            .map_err(|_| RedirectToGate)?;

        // Unreadable sessions count as not authenticated
        if session.is_authenticated().await.unwrap_or(false) {
            Ok(Self)
        } else {
            tracing::debug!(path = %parts.uri.path(), "Gate not passed, redirecting");
            Err(RedirectToGate)
        }
    }
}
