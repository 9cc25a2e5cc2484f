//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products (behind the gate)
//! GET  /                       - Product listing (?delete={id} opens the confirmation)
//! GET  /create                 - New product form
//! POST /create                 - Create product
//! GET  /edit/{id}              - Edit product form
//! POST /edit/{id}              - Replace product
//! POST /delete/{id}            - Delete product
//!
//! # Pattern gate
//! GET  /auth/gate              - Gate page (fires due deadlines)
//! POST /auth/gate/start        - Reveal the pattern
//! POST /auth/gate/select       - Select a colour (form field `color`)
//! POST /auth/gate/reset        - Draw a new pattern
//! POST /auth/logout            - Clear the grant
//!
//! GET  /static/*               - Stylesheet
//! ```

pub mod gate;
pub mod product_form;
pub mod products;

use std::time::Duration;

use askama::Template;
use axum::{
    Router,
    response::Html,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Directory the stylesheet is served from.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the application routes (without layers or state).
pub fn routes() -> Router<AppState> {
    Router::new()
        // Products
        .route("/", get(products::index))
        .route(
            "/create",
            get(product_form::new_product).post(product_form::create),
        )
        .route(
            "/edit/{id}",
            get(product_form::edit).post(product_form::update),
        )
        .route("/delete/{id}", post(products::delete))
        // Gate
        .route("/auth/gate", get(gate::show))
        .route("/auth/gate/start", post(gate::start))
        .route("/auth/gate/select", post(gate::select))
        .route("/auth/gate/reset", post(gate::reset))
        .route("/auth/logout", post(gate::logout))
}

/// Build the complete application: routes, static files, middleware and
/// state.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config(), state.sessions().clone());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the products API.
async fn health() -> &'static str {
    "ok"
}

// =============================================================================
// Shared page pieces
// =============================================================================

/// Page chrome shared by every template.
#[derive(Debug, Clone)]
pub struct Layout {
    pub title: &'static str,
    /// Show the navigation bar and logout button.
    pub show_nav: bool,
    /// Reload (or move on) after a delay.
    pub refresh: Option<Refresh>,
}

impl Layout {
    /// Layout for pages behind the gate.
    #[must_use]
    pub const fn main(title: &'static str) -> Self {
        Self {
            title,
            show_nav: true,
            refresh: None,
        }
    }
}

/// A `<meta http-equiv="refresh">` instruction.
#[derive(Debug, Clone)]
pub struct Refresh {
    /// Whole seconds, rounded up.
    pub seconds: u64,
    pub url: &'static str,
}

impl Refresh {
    #[must_use]
    pub fn after(delay: Duration, url: &'static str) -> Self {
        Self {
            seconds: delay.as_millis().div_ceil(1000).try_into().unwrap_or(u64::MAX),
            url,
        }
    }
}

/// Render a template, falling back to a plain error body.
fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::AdminConfig;

    fn test_app() -> Router {
        // Nothing listens on the discard port; these tests never reach the API.
        let api = Url::parse("http://127.0.0.1:9/api/products").unwrap();
        app(AppState::new(AdminConfig::local(api)).unwrap())
    }

    async fn get(uri: &str) -> axum::response::Response {
        test_app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_carries_security_headers_and_request_id() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::REFERRER_POLICY], "no-referrer");
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(headers.contains_key(crate::middleware::REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_incoming_request_id_is_echoed() {
        let response = test_app()
            .oneshot(
                Request::get("/health")
                    .header(crate::middleware::REQUEST_ID_HEADER, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[crate::middleware::REQUEST_ID_HEADER], "req-42");
    }

    #[tokio::test]
    async fn test_unusable_request_id_is_replaced() {
        let oversized = "x".repeat(crate::middleware::request_id::MAX_REQUEST_ID_LEN + 1);
        let response = test_app()
            .oneshot(
                Request::get("/health")
                    .header(crate::middleware::REQUEST_ID_HEADER, oversized.as_str())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let echoed = response.headers()[crate::middleware::REQUEST_ID_HEADER]
            .to_str()
            .unwrap();
        assert_ne!(echoed, oversized);
        assert!(uuid::Uuid::parse_str(echoed).is_ok());
    }

    #[tokio::test]
    async fn test_pages_behind_gate_redirect_without_grant() {
        for uri in ["/", "/create", "/edit/abc"] {
            let response = get(uri).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(response.headers()[header::LOCATION], "/auth/gate", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_gate_page_renders_and_sets_session_cookie() {
        let response = get("/auth/gate").await;
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(crate::middleware::SESSION_COOKIE_NAME));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn test_refresh_rounds_up_to_whole_seconds() {
        assert_eq!(Refresh::after(Duration::from_millis(1500), "/").seconds, 2);
        assert_eq!(Refresh::after(Duration::from_secs(3), "/").seconds, 3);
        assert_eq!(Refresh::after(Duration::from_millis(1), "/").seconds, 1);
        assert_eq!(Refresh::after(Duration::ZERO, "/").seconds, 0);
    }
}
