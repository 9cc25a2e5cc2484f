//! Integration tests for product management pages.
//!
//! Each test passes the gate first, then drives the pages against the fake
//! products API and checks both the rendered HTML and the API traffic.

use catalog_admin_integration_tests::{PRODUCTS_PATH, TestApp};
use reqwest::StatusCode;
use serde_json::json;

const CASE_FORM: [(&str, &str); 4] = [
    ("name", "Case"),
    ("category", "Covers & Protectors"),
    ("price", "500"),
    ("image", "http://x/y.png"),
];

/// A test app that has already passed the gate.
async fn signed_in() -> TestApp {
    let app = TestApp::spawn().await;
    let page = app.pass_gate().await;
    assert_eq!(page.path, "/", "gate not passed:\n{}", page.body);
    app
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_empty_catalog_shows_empty_state() {
    let app = signed_in().await;

    let page = app.get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("No Products Found"));
    assert!(page.body.contains(r#"href="/create""#));
}

#[tokio::test]
async fn test_list_shows_seeded_products() {
    let app = signed_in().await;
    app.api
        .seed("Laptop Pro", "Laptops", 125_000.5, "https://img.example/l.png")
        .await;

    let page = app.get("/").await;
    assert!(page.body.contains("Laptop Pro"));
    assert!(page.body.contains("Ksh 125,000.5"));
    assert!(page.body.contains("Laptops"));
    assert!(!page.body.contains("No Products Found"));
}

#[tokio::test]
async fn test_list_failure_shows_inline_error() {
    let app = signed_in().await;
    app.api.set_failing(true);

    let page = app.get("/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Error loading products"));
    assert!(page.body.contains("No Products Found"));
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_product_appears_in_list() {
    let app = signed_in().await;

    let page = app.post_form("/create", &CASE_FORM).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.path, "/create");
    assert!(page.body.contains("Product created successfully!"));
    assert!(page.body.contains(r#"http-equiv="refresh""#));

    let posts = app.api.requests_with_method("POST").await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].path, PRODUCTS_PATH);

    let stored = app.api.products().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["name"], json!("Case"));
    assert_eq!(stored[0]["category"], json!("Covers & Protectors"));
    assert_eq!(stored[0]["price"].as_f64(), Some(500.0));
    assert_eq!(stored[0]["image"], json!("http://x/y.png"));
    assert!(stored[0].get("_id").is_some());

    let page = app.get("/").await;
    assert!(page.body.contains("Case"));
    assert!(page.body.contains("Ksh 500"));
}

#[tokio::test]
async fn test_reloading_confirmation_does_not_create_again() {
    let app = signed_in().await;

    let page = app.post_form("/create", &CASE_FORM).await;
    assert_eq!(page.path, "/create");

    // What the browser requests on reload after the redirect
    let page = app.get("/create?saved=1").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Product created successfully!"));

    assert_eq!(app.api.requests_with_method("POST").await.len(), 1);
    assert_eq!(app.api.products().await.len(), 1);
}

#[tokio::test]
async fn test_invalid_input_never_reaches_api() {
    let app = signed_in().await;

    let cases: [(&str, &str, &str); 4] = [
        ("name", "   ", "name is required"),
        ("category", "Tablets", "unknown category"),
        ("price", "-5", "price cannot be negative"),
        ("image", "not a url", "image must be an http or https URL"),
    ];

    for (field, value, message) in cases {
        let form: Vec<(&str, &str)> = CASE_FORM
            .iter()
            .map(|&(k, v)| if k == field { (k, value) } else { (k, v) })
            .collect();

        let page = app.post_form("/create", &form).await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(
            page.body.contains(message),
            "expected '{message}' for {field}:\n{}",
            page.body
        );
        assert!(!page.body.contains("Product created successfully!"));
    }

    assert!(app.api.requests_with_method("POST").await.is_empty());
    assert!(app.api.products().await.is_empty());
}

#[tokio::test]
async fn test_save_failure_keeps_form_values() {
    let app = signed_in().await;
    app.api.set_failing(true);

    let page = app.post_form("/create", &CASE_FORM).await;
    assert!(page.body.contains("Error saving product. Please try again."));
    assert!(page.body.contains(r#"value="Case""#));
    assert!(page.body.contains(r#"value="500""#));
    assert!(!page.body.contains(r#"http-equiv="refresh""#));
}

// ============================================================================
// Edit
// ============================================================================

#[tokio::test]
async fn test_edit_prepopulates_and_updates() {
    let app = signed_in().await;
    let id = app
        .api
        .seed("Case", "Covers & Protectors", 500.0, "http://x/y.png")
        .await;

    let page = app.get(&format!("/edit/{id}")).await;
    assert!(page.body.contains("Edit Product"));
    assert!(page.body.contains(r#"value="Case""#));
    assert!(page.body.contains(r#"value="500""#));
    assert!(page.body.contains("selected>Covers &#38; Protectors"));

    let page = app
        .post_form(
            &format!("/edit/{id}"),
            &[
                ("name", "Rugged Case"),
                ("category", "Covers & Protectors"),
                ("price", "650.50"),
                ("image", "http://x/y.png"),
            ],
        )
        .await;
    assert_eq!(page.path, format!("/edit/{id}"));
    assert!(page.body.contains("Product updated successfully!"));

    let page = app.get(&format!("/edit/{id}?saved=1")).await;
    assert!(page.body.contains("Product updated successfully!"));

    let puts = app.api.requests_with_method("PUT").await;
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].path, format!("{PRODUCTS_PATH}/{id}"));

    let page = app.get("/").await;
    assert!(page.body.contains("Rugged Case"));
    assert!(page.body.contains("Ksh 650.5"));
}

#[tokio::test]
async fn test_edit_unknown_product_shows_load_error() {
    let app = signed_in().await;

    let page = app.get("/edit/missing").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Error loading product"));
    assert!(page.body.contains(r#"value="""#));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_cancelled_delete_issues_no_request() {
    let app = signed_in().await;
    let id = app
        .api
        .seed("Case", "Covers & Protectors", 500.0, "http://x/y.png")
        .await;

    let page = app.get(&format!("/?delete={id}")).await;
    assert!(page.body.contains("This action cannot be undone."));
    assert!(page.body.contains(&format!(r#"action="/delete/{id}""#)));

    // Cancel is a plain link back to the list.
    let page = app.get("/").await;
    assert!(page.body.contains("Case"));
    assert!(!page.body.contains("This action cannot be undone."));

    assert!(app.api.requests_with_method("DELETE").await.is_empty());
    assert_eq!(app.api.products().await.len(), 1);
}

#[tokio::test]
async fn test_confirmed_delete_removes_product() {
    let app = signed_in().await;
    let id = app
        .api
        .seed("Case", "Covers & Protectors", 500.0, "http://x/y.png")
        .await;

    let page = app.post_form(&format!("/delete/{id}"), &[]).await;
    assert_eq!(page.path, "/");
    assert!(!page.body.contains("Case"));
    assert!(page.body.contains("No Products Found"));

    let deletes = app.api.requests_with_method("DELETE").await;
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].path, format!("{PRODUCTS_PATH}/{id}"));
}

#[tokio::test]
async fn test_delete_failure_still_returns_to_list() {
    let app = signed_in().await;
    let id = app
        .api
        .seed("Case", "Covers & Protectors", 500.0, "http://x/y.png")
        .await;
    app.api.set_failing(true);

    let page = app.post_form(&format!("/delete/{id}"), &[]).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.path, "/");

    app.api.set_failing(false);
    assert_eq!(app.api.products().await.len(), 1);
}

#[tokio::test]
async fn test_confirmation_for_unknown_id_is_not_shown() {
    let app = signed_in().await;
    app.api
        .seed("Case", "Covers & Protectors", 500.0, "http://x/y.png")
        .await;

    let page = app.get("/?delete=nope").await;
    assert!(!page.body.contains("This action cannot be undone."));
}
