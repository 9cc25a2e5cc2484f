//! Products REST API client.
//!
//! All catalog persistence lives behind an external REST resource:
//!
//! ```text
//! GET    {base}        -> [Product]
//! GET    {base}/{id}   -> Product
//! POST   {base}        -> Product      (body: product without id)
//! PUT    {base}/{id}   -> Product      (body: full product)
//! PATCH  {base}/{id}   -> Product      (body: changed fields)
//! DELETE {base}/{id}   -> no content
//! ```
//!
//! There is no retry, timeout, or backoff policy beyond reqwest's defaults;
//! failures are returned to the caller as-is.

mod error;

pub use error::ProductsApiError;

use std::sync::Arc;

use catalog_admin_core::{Product, ProductId, ProductInput, ProductPatch};
use tracing::instrument;
use url::Url;

/// Products API client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ProductsClient {
    inner: Arc<ProductsClientInner>,
}

struct ProductsClientInner {
    client: reqwest::Client,
    /// Collection URL without a trailing slash.
    base_url: String,
}

impl ProductsClient {
    /// Create a client for the collection at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url) -> Result<Self, ProductsApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("catalog-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ProductsClientInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            }),
        })
    }

    /// Collection URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// URL of a single product. The id is encoded as one path segment.
    fn item_url(&self, id: &ProductId) -> String {
        format!(
            "{}/{}",
            self.inner.base_url,
            urlencoding::encode(id.as_str())
        )
    }

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or an
    /// unparseable body.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductsApiError> {
        let response = self.inner.client.get(&self.inner.base_url).send().await?;
        let products: Vec<Product> = Self::handle_response(response, None).await?;
        tracing::debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a 404, otherwise as [`Self::list_products`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ProductsApiError> {
        let response = self.inner.client.get(self.item_url(id)).send().await?;
        Self::handle_response(response, Some(id)).await
    }

    /// Create a product. The server assigns the id.
    ///
    /// # Errors
    ///
    /// As [`Self::list_products`].
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ProductsApiError> {
        let response = self
            .inner
            .client
            .post(&self.inner.base_url)
            .json(input)
            .send()
            .await?;
        let product: Product = Self::handle_response(response, None).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// As [`Self::get_product`].
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ProductsApiError> {
        let response = self
            .inner
            .client
            .put(self.item_url(id))
            .json(input)
            .send()
            .await?;
        let product = Self::handle_response(response, Some(id)).await?;
        tracing::info!("Product updated");
        Ok(product)
    }

    /// Update only the fields present in `patch`.
    ///
    /// # Errors
    ///
    /// As [`Self::get_product`].
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn patch_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ProductsApiError> {
        let response = self
            .inner
            .client
            .patch(self.item_url(id))
            .json(patch)
            .send()
            .await?;
        Self::handle_response(response, Some(id)).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// As [`Self::get_product`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ProductsApiError> {
        let response = self.inner.client.delete(self.item_url(id)).send().await?;

        if response.status().is_success() {
            tracing::info!("Product deleted");
            return Ok(());
        }

        Err(Self::parse_error(response, Some(id)).await)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        id: Option<&ProductId>,
    ) -> Result<T, ProductsApiError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ProductsApiError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response, id).await)
    }

    /// Turn a non-success response into an error.
    async fn parse_error(response: reqwest::Response, id: Option<&ProductId>) -> ProductsApiError {
        let status = response.status().as_u16();

        if status == 404 {
            let what = id.map_or_else(|| "products".to_string(), ToString::to_string);
            return ProductsApiError::NotFound(what);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::warn!(status, %message, "Products API returned an error");
        ProductsApiError::Api { status, message }
    }
}

impl std::fmt::Debug for ProductsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductsClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ProductsClient {
        ProductsClient::new(&Url::parse(base).unwrap()).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = client("http://localhost:5000/api/products/");
        assert_eq!(client.base_url(), "http://localhost:5000/api/products");
    }

    #[test]
    fn test_item_url_encodes_id_as_single_segment() {
        let client = client("http://localhost:5000/api/products");
        assert_eq!(
            client.item_url(&ProductId::new("650c1f2ab3")),
            "http://localhost:5000/api/products/650c1f2ab3"
        );
        assert_eq!(
            client.item_url(&ProductId::new("a/b c")),
            "http://localhost:5000/api/products/a%2Fb%20c"
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = client("http://127.0.0.1:9/api/products");
        let err = client.list_products().await.unwrap_err();
        assert!(matches!(err, ProductsApiError::Http(_)));
    }
}
