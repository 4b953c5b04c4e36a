//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::erp::ErpClient;
use crate::forms::ProductCatalog;
use crate::forms::catalog::CatalogError;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, the ERP client, and
/// the loaded product catalog.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    erp: ErpClient,
    catalog: ProductCatalog,
}

impl AppState {
    /// Create the application state, loading the product catalog override
    /// file when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or parsed.
    pub fn new(config: GatewayConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.forms.catalog_path {
            Some(path) => ProductCatalog::with_overrides(path)?,
            None => ProductCatalog::builtin(),
        };
        let erp = ErpClient::new(&config.erp);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                erp,
                catalog,
            }),
        })
    }

    /// Get a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Get a reference to the ERP client.
    #[must_use]
    pub fn erp(&self) -> &ErpClient {
        &self.inner.erp
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.inner.catalog
    }
}
