//! Create and edit form handlers.
//!
//! The same template serves both modes. Submitted values are validated into
//! a `ProductInput` before any request goes out; on validation or save
//! failure the form is shown again with what the operator typed.
//!
//! A successful save redirects to the form with `?saved=1`, so reloading
//! the confirmation never submits the product twice.

use std::time::Duration;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use catalog_admin_core::{Category, ProductDraft, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::{filters, middleware::GatePassed, state::AppState};

use super::{Layout, Refresh, render};

pub const CREATED_MESSAGE: &str = "Product created successfully!";
pub const UPDATED_MESSAGE: &str = "Product updated successfully!";
pub const SAVE_ERROR_MESSAGE: &str = "Error saving product. Please try again.";
pub const LOAD_ERROR_MESSAGE: &str = "Error loading product";

/// How long the success message stays up before returning to the list.
pub const SUCCESS_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Query parameters of the form pages.
#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    /// Present after a successful save.
    pub saved: Option<String>,
}

impl FormQuery {
    const fn is_saved(&self) -> bool {
        self.saved.is_some()
    }
}

/// Where a successful create lands.
const CREATED_PATH: &str = "/create?saved=1";

fn updated_path(id: &str) -> String {
    format!("/edit/{}?saved=1", urlencoding::encode(id))
}

/// One `<option>` of the category select.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Product form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    /// Id of the product being edited; `None` in create mode.
    pub product_id: Option<String>,
    pub draft: ProductDraft,
    pub categories: Vec<CategoryOption>,
    pub success: Option<&'static str>,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    fn new(product_id: Option<String>, draft: ProductDraft) -> Self {
        let title = if product_id.is_some() {
            "Edit Product"
        } else {
            "Create New Product"
        };
        let categories = category_options(&draft.category);

        Self {
            layout: Layout::main(title),
            product_id,
            draft,
            categories,
            success: None,
            error: None,
        }
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    fn with_success(mut self, message: &'static str) -> Self {
        self.success = Some(message);
        self.layout.refresh = Some(Refresh::after(SUCCESS_REDIRECT_DELAY, "/"));
        self
    }

    /// Form action URL.
    #[must_use]
    pub fn action(&self) -> String {
        self.product_id.as_ref().map_or_else(
            || "/create".to_string(),
            |id| format!("/edit/{}", urlencoding::encode(id)),
        )
    }
}

fn category_options(selected: &str) -> Vec<CategoryOption> {
    let selected = selected.trim();
    Category::ALL
        .iter()
        .map(|category| CategoryOption {
            value: category.as_str(),
            selected: category.as_str() == selected,
        })
        .collect()
}

/// New product form handler; shows the confirmation after a create.
#[instrument]
pub async fn new_product(_: GatePassed, Query(query): Query<FormQuery>) -> Html<String> {
    let form = ProductFormTemplate::new(None, ProductDraft::default());
    if query.is_saved() {
        render(&form.with_success(CREATED_MESSAGE))
    } else {
        render(&form)
    }
}

/// Create product handler.
#[instrument(skip(state, draft))]
pub async fn create(
    _: GatePassed,
    State(state): State<AppState>,
    Form(draft): Form<ProductDraft>,
) -> Response {
    let input = match draft.validate() {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!(error = %e, "Product form rejected");
            return render(&ProductFormTemplate::new(None, draft).with_error(invalid(&e)))
                .into_response();
        }
    };

    match state.products().create_product(&input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, name = %product.name, "Product created");
            Redirect::to(CREATED_PATH).into_response()
        }
        Err(e) => {
            tracing::error!(name = %input.name, error = %e, "Failed to create product");
            render(&ProductFormTemplate::new(None, draft).with_error(SAVE_ERROR_MESSAGE))
                .into_response()
        }
    }
}

/// Edit product form handler; shows the confirmation after an update.
#[instrument(skip(state))]
pub async fn edit(
    _: GatePassed,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FormQuery>,
) -> Html<String> {
    if query.is_saved() {
        return render(
            &ProductFormTemplate::new(Some(id), ProductDraft::default())
                .with_success(UPDATED_MESSAGE),
        );
    }

    let product_id = ProductId::new(id.clone());
    match state.products().get_product(&product_id).await {
        Ok(product) => render(&ProductFormTemplate::new(
            Some(id),
            ProductDraft::from(&product),
        )),
        Err(e) => {
            tracing::error!(product_id = %product_id, error = %e, "Failed to fetch product");
            render(
                &ProductFormTemplate::new(Some(id), ProductDraft::default())
                    .with_error(LOAD_ERROR_MESSAGE),
            )
        }
    }
}

/// Update product handler.
#[instrument(skip(state, draft))]
pub async fn update(
    _: GatePassed,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(draft): Form<ProductDraft>,
) -> Response {
    let input = match draft.validate() {
        Ok(input) => input,
        Err(e) => {
            tracing::debug!(error = %e, "Product form rejected");
            return render(&ProductFormTemplate::new(Some(id), draft).with_error(invalid(&e)))
                .into_response();
        }
    };

    let product_id = ProductId::new(id.clone());
    match state.products().update_product(&product_id, &input).await {
        Ok(_) => {
            tracing::info!(product_id = %product_id, "Product updated");
            Redirect::to(&updated_path(&id)).into_response()
        }
        Err(e) => {
            tracing::error!(product_id = %product_id, error = %e, "Failed to update product");
            render(&ProductFormTemplate::new(Some(id), draft).with_error(SAVE_ERROR_MESSAGE))
                .into_response()
        }
    }
}

fn invalid(error: &catalog_admin_core::ProductInputError) -> String {
    format!("Invalid product: {error}")
}
