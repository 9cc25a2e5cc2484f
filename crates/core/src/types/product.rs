//! Product record and its validated input form.
//!
//! [`Product`] is what the products API returns. [`ProductDraft`] is the raw
//! text the operator typed into the form, and [`ProductInput`] is the draft
//! after validation - the only type that may be sent to the API.

use serde::{Deserialize, Serialize};
use url::Url;

use super::category::{Category, CategoryError};
use super::id::ProductId;
use super::price::{Price, PriceError};

/// A catalog product as stored by the products API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    pub price: Price,
    /// Image URL.
    pub image: String,
}

/// Errors that can occur when validating a [`ProductDraft`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductInputError {
    /// The name is blank.
    #[error("name is required")]
    EmptyName,
    /// The name is too long.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// No category was selected.
    #[error("category is required")]
    MissingCategory,
    /// The category is not one of the known values.
    #[error(transparent)]
    Category(#[from] CategoryError),
    /// The price failed validation.
    #[error(transparent)]
    Price(#[from] PriceError),
    /// The image URL is blank.
    #[error("image URL is required")]
    EmptyImage,
    /// The image URL is not an absolute http(s) URL.
    #[error("image must be an http or https URL")]
    InvalidImage,
}

/// Raw product form fields, exactly as submitted.
///
/// Every field is a string so the form can be re-rendered with whatever the
/// operator typed when validation or saving fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image: String,
}

impl ProductDraft {
    /// Validate the draft into a [`ProductInput`].
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation, checked in form order.
    pub fn validate(&self) -> Result<ProductInput, ProductInputError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductInputError::EmptyName);
        }
        if name.chars().count() > ProductInput::MAX_NAME_LENGTH {
            return Err(ProductInputError::NameTooLong {
                max: ProductInput::MAX_NAME_LENGTH,
            });
        }

        if self.category.trim().is_empty() {
            return Err(ProductInputError::MissingCategory);
        }
        let category = self.category.parse::<Category>()?;

        let price = Price::parse(&self.price)?;

        let image = self.image.trim();
        if image.is_empty() {
            return Err(ProductInputError::EmptyImage);
        }
        let url = Url::parse(image).map_err(|_| ProductInputError::InvalidImage)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProductInputError::InvalidImage);
        }

        Ok(ProductInput {
            name: name.to_owned(),
            category,
            price,
            image: image.to_owned(),
        })
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.as_str().to_owned(),
            price: product.price.to_string(),
            image: product.image.clone(),
        }
    }
}

/// A validated product body for create and full update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub category: Category,
    pub price: Price,
    pub image: String,
}

impl ProductInput {
    /// Maximum product name length in characters.
    pub const MAX_NAME_LENGTH: usize = 200;
}

/// A partial update. Only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductPatch {
    /// Returns true if the patch would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.image.is_none()
    }
}
