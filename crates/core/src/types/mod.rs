//! Core types for the product catalog.
//!
//! This module provides type-safe wrappers for catalog domain concepts.

pub mod category;
pub mod id;
pub mod price;
pub mod product;

pub use category::{Category, CategoryError};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, ProductDraft, ProductInput, ProductInputError, ProductPatch};
