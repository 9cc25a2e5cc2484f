//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ProductsApiError, ProductsClient};
use crate::config::AdminConfig;
use crate::gate::GateTimings;
use crate::middleware::SessionCache;

/// Application state shared across all handlers.
///
/// Cheap to clone; wraps an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    products: ProductsClient,
    gate_timings: GateTimings,
    sessions: SessionCache,
}

impl AppState {
    /// Build state with the default gate timings.
    ///
    /// # Errors
    ///
    /// Returns error if the products client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, ProductsApiError> {
        Self::with_gate_timings(config, GateTimings::default())
    }

    /// Build state with custom gate timings.
    ///
    /// # Errors
    ///
    /// Returns error if the products client cannot be built.
    pub fn with_gate_timings(
        config: AdminConfig,
        gate_timings: GateTimings,
    ) -> Result<Self, ProductsApiError> {
        let products = ProductsClient::new(&config.products_api_url)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                gate_timings,
                sessions: SessionCache::default(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn products(&self) -> &ProductsClient {
        &self.inner.products
    }

    #[must_use]
    pub fn gate_timings(&self) -> GateTimings {
        self.inner.gate_timings
    }

    /// Store behind the session layer.
    #[must_use]
    pub fn sessions(&self) -> &SessionCache {
        &self.inner.sessions
    }
}
