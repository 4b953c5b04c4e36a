//! Product record operations on `product.product`.
//!
//! Product identity is the full display name with options folded in, so each
//! option combination ("Tote Bag (Blue, Large)") gets its own record. That
//! mirrors how the order forms sold their products: no variant matrix, just
//! named line items.

use formbridge_core::ProductId;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, instrument};

use super::client::ErpClient;
use super::types::NewProduct;
use super::ErpError;

impl ErpClient {
    /// Find a product by exact name match.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the search call fails.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn find_product_by_name(&self, name: &str) -> Result<Option<ProductId>, ErpError> {
        let ids: Vec<i32> = self
            .execute_kw(
                "product.product",
                "search",
                json!([[["name", "=", name]]]),
                json!({"limit": 1}),
            )
            .await?;

        Ok(ids.into_iter().next().map(ProductId::new))
    }

    /// Create a product record, returning its id.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the create call fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<ProductId, ErpError> {
        let id: i32 = self
            .execute_kw(
                "product.product",
                "create",
                json!([product.into_values()]),
                json!({}),
            )
            .await?;

        Ok(ProductId::new(id))
    }

    /// Find the product with this display name, creating it (at the given
    /// list price) when none exists.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if any remote call fails.
    #[instrument(skip(self, list_price), fields(name = %name))]
    pub async fn find_or_create_product(
        &self,
        name: &str,
        list_price: Decimal,
    ) -> Result<ProductId, ErpError> {
        if let Some(existing) = self.find_product_by_name(name).await? {
            debug!(product_id = %existing, "Matched existing product");
            return Ok(existing);
        }

        let id = self
            .create_product(NewProduct {
                name: name.to_string(),
                list_price,
            })
            .await?;
        debug!(product_id = %id, "Created product");
        Ok(id)
    }
}
