//! Product listing and deletion handlers.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use catalog_admin_core::{Product, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::{filters, middleware::GatePassed, state::AppState};

use super::{Layout, render};

/// Shown when the product list cannot be fetched.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading products";

/// Query parameters for the listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Product to confirm deletion of.
    pub delete: Option<String>,
}

/// Product view for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    /// Id encoded as a single URL path segment.
    pub path_id: String,
    pub name: String,
    pub category: &'static str,
    /// Formatted price, e.g. `Ksh 1,234.5`.
    pub price: String,
    pub image: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            path_id: urlencoding::encode(product.id.as_str()).into_owned(),
            name: product.name.clone(),
            category: product.category.as_str(),
            price: product.price.display(),
            image: product.image.clone(),
        }
    }
}

/// Products list page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub error: Option<&'static str>,
    /// Product awaiting delete confirmation.
    pub confirm_delete: Option<ProductView>,
}

/// Products list page handler.
#[instrument(skip(state))]
pub async fn index(
    _: GatePassed,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Html<String> {
    let (products, error) = match state.products().list_products().await {
        Ok(products) => (products, None),
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            (vec![], Some(LOAD_ERROR_MESSAGE))
        }
    };

    let confirm_delete = query.delete.as_deref().and_then(|id| {
        products
            .iter()
            .find(|product| product.id.as_str() == id)
            .map(ProductView::from)
    });

    let template = ProductsIndexTemplate {
        layout: Layout::main("Product Management"),
        products: products.iter().map(ProductView::from).collect(),
        error,
        confirm_delete,
    };

    render(&template)
}

/// Delete product handler.
///
/// A failed delete is logged; the listing is shown again either way.
#[instrument(skip(state))]
pub async fn delete(
    _: GatePassed,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    let id = ProductId::new(id);
    if let Err(e) = state.products().delete_product(&id).await {
        tracing::error!(product_id = %id, error = %e, "Failed to delete product");
    }
    Redirect::to("/")
}
