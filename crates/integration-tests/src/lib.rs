//! Integration test harness for Catalog Admin.
//!
//! Every test gets its own in-process stack on ephemeral ports:
//!
//! - [`FakeProductsApi`]: an in-memory stand-in for the products REST API
//!   that records every request and can be told to fail.
//! - [`TestApp`]: the admin router pointed at the fake, plus a
//!   cookie-enabled client that follows redirects like a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p catalog-admin-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use catalog_admin::gate::GateTimings;
use catalog_admin::{AdminConfig, AppState};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

/// Collection path served by the fake API.
pub const PRODUCTS_PATH: &str = "/api/products";

/// Extra wait on top of a gate delay before acting on it.
pub const TIMING_SLACK: Duration = Duration::from_millis(150);

/// Short gate delays so tests run quickly.
#[must_use]
pub const fn test_timings() -> GateTimings {
    GateTimings {
        reveal: Duration::from_millis(300),
        success_delay: Duration::ZERO,
        failure_delay: Duration::from_millis(300),
    }
}

/// Bind a router to `127.0.0.1:0` and serve it in the background.
async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server error");
    });

    addr
}

// =============================================================================
// Fake products API
// =============================================================================

/// A request seen by the fake API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
}

#[derive(Clone, Default)]
struct FakeState {
    inner: Arc<FakeInner>,
}

#[derive(Default)]
struct FakeInner {
    products: Mutex<Vec<Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
    next_id: AtomicU64,
    failing: AtomicBool,
}

/// In-memory products API.
#[derive(Clone)]
pub struct FakeProductsApi {
    addr: SocketAddr,
    state: FakeState,
}

impl FakeProductsApi {
    /// Start the fake on an ephemeral port.
    pub async fn spawn() -> Self {
        let state = FakeState::default();

        let router = Router::new()
            .route(PRODUCTS_PATH, get(list_products).post(create_product))
            .route(
                "/api/products/{id}",
                get(get_product)
                    .put(replace_product)
                    .patch(patch_product)
                    .delete(delete_product),
            )
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                record_and_inject_failure,
            ))
            .with_state(state.clone());

        let addr = serve(router).await;
        Self { addr, state }
    }

    /// Collection URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}{PRODUCTS_PATH}", self.addr)).expect("valid fake API URL")
    }

    /// Store a product directly and return its id.
    pub async fn seed(&self, name: &str, category: &str, price: f64, image: &str) -> String {
        let id = self.state.next_id();
        self.state.inner.products.lock().await.push(json!({
            "_id": id,
            "name": name,
            "category": category,
            "price": price,
            "image": image,
        }));
        id
    }

    /// Current stored products.
    pub async fn products(&self) -> Vec<Value> {
        self.state.inner.products.lock().await.clone()
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.inner.requests.lock().await.clone()
    }

    /// Requests with the given method.
    pub async fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    /// Make every subsequent request fail with 500.
    pub fn set_failing(&self, failing: bool) {
        self.state.inner.failing.store(failing, Ordering::SeqCst);
    }
}

impl FakeState {
    fn next_id(&self) -> String {
        format!("p{}", self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

async fn record_and_inject_failure(
    State(state): State<FakeState>,
    request: Request,
    next: Next,
) -> Response {
    state.inner.requests.lock().await.push(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
    });

    if state.inner.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }

    next.run(request).await
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Product not found" })),
    )
        .into_response()
}

fn has_id(product: &Value, id: &str) -> bool {
    product.get("_id").and_then(Value::as_str) == Some(id)
}

async fn list_products(State(state): State<FakeState>) -> Json<Vec<Value>> {
    Json(state.inner.products.lock().await.clone())
}

async fn create_product(State(state): State<FakeState>, Json(mut body): Json<Value>) -> Response {
    let id = state.next_id();
    if let Some(fields) = body.as_object_mut() {
        fields.insert("_id".to_string(), json!(id));
    }
    state.inner.products.lock().await.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_product(State(state): State<FakeState>, Path(id): Path<String>) -> Response {
    let products = state.inner.products.lock().await;
    products
        .iter()
        .find(|p| has_id(p, &id))
        .map_or_else(not_found, |p| Json(p.clone()).into_response())
}

async fn replace_product(
    State(state): State<FakeState>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut products = state.inner.products.lock().await;
    let Some(slot) = products.iter_mut().find(|p| has_id(p, &id)) else {
        return not_found();
    };
    if let Some(fields) = body.as_object_mut() {
        fields.insert("_id".to_string(), json!(id));
    }
    *slot = body.clone();
    Json(body).into_response()
}

async fn patch_product(
    State(state): State<FakeState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut products = state.inner.products.lock().await;
    let Some(slot) = products.iter_mut().find(|p| has_id(p, &id)) else {
        return not_found();
    };
    if let (Some(target), Some(changes)) = (slot.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(slot.clone()).into_response()
}

async fn delete_product(State(state): State<FakeState>, Path(id): Path<String>) -> Response {
    let mut products = state.inner.products.lock().await;
    let before = products.len();
    products.retain(|p| !has_id(p, &id));
    if products.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Admin app under test
// =============================================================================

/// A fetched page after redirects.
#[derive(Debug)]
pub struct Page {
    pub status: reqwest::StatusCode,
    /// Path of the final URL after redirects.
    pub path: String,
    pub body: String,
}

impl Page {
    async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let path = response.url().path().to_string();
        let body = response.text().await.expect("Failed to read body");
        Self { status, path, body }
    }
}

/// The admin app wired to a fresh fake API.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub api: FakeProductsApi,
    pub timings: GateTimings,
}

impl TestApp {
    /// Start the stack with [`test_timings`].
    pub async fn spawn() -> Self {
        Self::spawn_with_timings(test_timings()).await
    }

    /// Start the stack with custom gate timings.
    pub async fn spawn_with_timings(timings: GateTimings) -> Self {
        let api = FakeProductsApi::spawn().await;

        let config = AdminConfig::local(api.url());
        let state =
            AppState::with_gate_timings(config, timings).expect("Failed to build admin state");
        let addr = serve(catalog_admin::app(state)).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{addr}"),
            client,
            api,
            timings,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a page, following redirects.
    pub async fn get(&self, path: &str) -> Page {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed");
        Page::from_response(response).await
    }

    /// POST a form, following redirects.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Page {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST failed");
        Page::from_response(response).await
    }

    /// Reveal the pattern and return it as colour names.
    pub async fn reveal_pattern(&self) -> Vec<String> {
        let page = self.post_form("/auth/gate/start", &[]).await;
        let pattern = pattern_colors(&page.body);
        assert!(!pattern.is_empty(), "pattern not shown:\n{}", page.body);
        pattern
    }

    /// Wait until the revealed pattern has been hidden.
    pub async fn wait_for_input(&self) {
        tokio::time::sleep(self.timings.reveal + TIMING_SLACK).await;
    }

    /// Replay colours in order and return the final page.
    pub async fn replay(&self, colors: &[String]) -> Page {
        let mut last = None;
        for color in colors {
            last = Some(
                self.post_form("/auth/gate/select", &[("color", color.as_str())])
                    .await,
            );
        }
        last.expect("replay needs at least one colour")
    }

    /// Pass the gate and return the page it lands on.
    pub async fn pass_gate(&self) -> Page {
        let pattern = self.reveal_pattern().await;
        self.wait_for_input().await;
        let page = self.replay(&pattern).await;
        if self.timings.success_delay.is_zero() {
            return page;
        }
        tokio::time::sleep(self.timings.success_delay + TIMING_SLACK).await;
        self.get("/auth/gate").await
    }
}

/// Colour names from the `data-pattern-color` attributes of a gate page.
#[must_use]
pub fn pattern_colors(html: &str) -> Vec<String> {
    const ATTR: &str = "data-pattern-color=\"";
    html.split(ATTR)
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_colors_reads_attributes_in_order() {
        let html = r#"<li data-pattern-color="red">1</li><li data-pattern-color="blue">2</li>"#;
        assert_eq!(pattern_colors(html), ["red", "blue"]);
        assert!(pattern_colors("<p>none</p>").is_empty());
    }
}
