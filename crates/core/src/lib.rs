//! Catalog Admin Core - Shared types library.
//!
//! This crate provides the catalog types used by the admin panel and its
//! integration tests:
//! - `admin` - Server-rendered administration panel
//! - `integration-tests` - End-to-end tests against a fake products API
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product record, category enum, price and input validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
