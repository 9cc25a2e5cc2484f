//! Integration tests for the products REST client.

use catalog_admin::api::{ProductsApiError, ProductsClient};
use catalog_admin_core::{Category, Price, ProductDraft, ProductId, ProductPatch};
use catalog_admin_integration_tests::{FakeProductsApi, PRODUCTS_PATH};
use serde_json::json;

async fn setup() -> (FakeProductsApi, ProductsClient) {
    let api = FakeProductsApi::spawn().await;
    let client = ProductsClient::new(&api.url()).expect("Failed to build client");
    (api, client)
}

fn case_input() -> catalog_admin_core::ProductInput {
    ProductDraft {
        name: "Case".to_string(),
        category: "Covers & Protectors".to_string(),
        price: "500".to_string(),
        image: "http://x/y.png".to_string(),
    }
    .validate()
    .expect("valid draft")
}

#[tokio::test]
async fn test_list_reads_server_ids() {
    let (api, client) = setup().await;
    let first = api.seed("Pixel 8", "Phones", 89_999.0, "https://img/p.png").await;
    let second = api.seed("USB-C Hub", "Accessories", 2_500.5, "https://img/h.png").await;

    let products = client.list_products().await.expect("list failed");
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, ProductId::new(first));
    assert_eq!(products[0].category, Category::Phones);
    assert_eq!(products[1].id, ProductId::new(second));
    assert_eq!(products[1].price, Price::parse("2500.5").unwrap());
}

#[tokio::test]
async fn test_create_sends_body_without_id() {
    let (api, client) = setup().await;

    let created = client.create_product(&case_input()).await.expect("create failed");
    assert_eq!(created.name, "Case");
    assert_eq!(created.category, Category::CoversAndProtectors);

    let stored = api.products().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["_id"], json!(created.id.as_str()));
    assert_eq!(api.requests().await[0].path, PRODUCTS_PATH);
}

#[tokio::test]
async fn test_get_missing_product_is_not_found() {
    let (_api, client) = setup().await;

    let err = client
        .get_product(&ProductId::new("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProductsApiError::NotFound(id) if id == "missing"));
}

#[tokio::test]
async fn test_update_replaces_every_field() {
    let (api, client) = setup().await;
    let id = api.seed("Old", "Phones", 1.0, "https://img/o.png").await;

    let updated = client
        .update_product(&ProductId::new(id.clone()), &case_input())
        .await
        .expect("update failed");
    assert_eq!(updated.id.as_str(), id);
    assert_eq!(updated.name, "Case");
    assert_eq!(updated.image, "http://x/y.png");

    let puts = api.requests_with_method("PUT").await;
    assert_eq!(puts[0].path, format!("{PRODUCTS_PATH}/{id}"));
}

#[tokio::test]
async fn test_patch_changes_only_given_fields() {
    let (api, client) = setup().await;
    let id = api.seed("Case", "Covers & Protectors", 500.0, "http://x/y.png").await;

    let patch = ProductPatch {
        price: Some(Price::parse("450").unwrap()),
        ..ProductPatch::default()
    };
    let patched = client
        .patch_product(&ProductId::new(id), &patch)
        .await
        .expect("patch failed");

    assert_eq!(patched.price, Price::parse("450").unwrap());
    assert_eq!(patched.name, "Case");
    assert_eq!(patched.category, Category::CoversAndProtectors);
    assert_eq!(api.requests_with_method("PATCH").await.len(), 1);
}

#[tokio::test]
async fn test_delete_removes_and_reports_missing() {
    let (api, client) = setup().await;
    let id = ProductId::new(api.seed("Case", "Phones", 1.0, "http://x/y.png").await);

    client.delete_product(&id).await.expect("delete failed");
    assert!(api.products().await.is_empty());

    let err = client.delete_product(&id).await.unwrap_err();
    assert!(matches!(err, ProductsApiError::NotFound(_)));
}

#[tokio::test]
async fn test_server_error_carries_status() {
    let (api, client) = setup().await;
    api.set_failing(true);

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(err, ProductsApiError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_malformed_record_is_parse_error() {
    let (api, client) = setup().await;
    api.seed("Tablet", "Tablets", 1.0, "http://x/y.png").await;

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(err, ProductsApiError::Parse(_)));
}
