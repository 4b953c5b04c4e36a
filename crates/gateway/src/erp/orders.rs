//! Sale order operations on `sale.order`.

use formbridge_core::SaleOrderId;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::client::ErpClient;
use super::types::NewSaleOrder;
use super::ErpError;

impl ErpClient {
    /// Create a sale order with its lines, returning the order id.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the create call fails.
    #[instrument(skip(self, order), fields(partner_id = %order.partner_id, lines = order.lines.len()))]
    pub async fn create_sale_order(&self, order: NewSaleOrder) -> Result<SaleOrderId, ErpError> {
        let id: i32 = self
            .execute_kw(
                "sale.order",
                "create",
                json!([order.into_values()]),
                json!({}),
            )
            .await?;

        debug!(sale_order_id = id, "Created sale order");
        Ok(SaleOrderId::new(id))
    }

    /// Confirm a sale order (quotation → confirmed order).
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the confirm call fails.
    #[instrument(skip(self))]
    pub async fn confirm_sale_order(&self, order: SaleOrderId) -> Result<(), ErpError> {
        // The return value is an action descriptor (or just `true`); only
        // failure matters here.
        let _: Value = self
            .execute_kw(
                "sale.order",
                "action_confirm",
                json!([[order.as_i32()]]),
                json!({}),
            )
            .await?;

        debug!(sale_order_id = %order, "Confirmed sale order");
        Ok(())
    }
}
