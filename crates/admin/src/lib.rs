//! Catalog Admin library.
//!
//! A server-rendered admin panel for a products catalog. All product data
//! lives behind an external REST API; this crate renders the pages, talks to
//! that API and guards the panel with a colour-pattern gate.
//!
//! The gate is a UX feature, not access control. Deploy the panel behind a
//! network boundary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod gate;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use config::AdminConfig;
pub use routes::app;
pub use state::AppState;
