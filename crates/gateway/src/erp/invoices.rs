//! Invoice operations: create from a sale order, post, and email.
//!
//! Invoice creation goes through the `sale.advance.payment.inv` wizard the
//! way the ERP's own UI does it: create the wizard record for the order,
//! run `create_invoices`, then read the order's `invoice_ids` to learn the
//! new invoice id. Posting and emailing operate on `account.move`.

use formbridge_core::{InvoiceId, SaleOrderId};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::client::ErpClient;
use super::ErpError;

impl ErpClient {
    /// Create a regular (non-advance) invoice for a confirmed sale order.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if a wizard call fails or the order ends up with no
    /// invoice.
    #[instrument(skip(self))]
    pub async fn create_invoice(&self, order: SaleOrderId) -> Result<InvoiceId, ErpError> {
        let context = json!({
            "active_ids": [order.as_i32()],
            "active_model": "sale.order",
        });

        let wizard_id: i32 = self
            .execute_kw(
                "sale.advance.payment.inv",
                "create",
                json!([{"advance_payment_method": "delivered"}]),
                json!({"context": context}),
            )
            .await?;

        let _: Value = self
            .execute_kw(
                "sale.advance.payment.inv",
                "create_invoices",
                json!([[wizard_id]]),
                json!({"context": context}),
            )
            .await?;

        #[derive(serde::Deserialize)]
        struct OrderInvoices {
            invoice_ids: Vec<i32>,
        }

        let rows: Vec<OrderInvoices> = self
            .execute_kw(
                "sale.order",
                "read",
                json!([[order.as_i32()], ["invoice_ids"]]),
                json!({}),
            )
            .await?;

        // The newest invoice is the one the wizard just created
        let invoice_id = rows
            .into_iter()
            .next()
            .and_then(|row| row.invoice_ids.into_iter().max())
            .ok_or_else(|| {
                ErpError::UnexpectedResponse(format!("order {order} has no invoices"))
            })?;

        debug!(invoice_id, sale_order_id = %order, "Created invoice");
        Ok(InvoiceId::new(invoice_id))
    }

    /// Post a draft invoice.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the post call fails.
    #[instrument(skip(self))]
    pub async fn post_invoice(&self, invoice: InvoiceId) -> Result<(), ErpError> {
        let _: Value = self
            .execute_kw(
                "account.move",
                "action_post",
                json!([[invoice.as_i32()]]),
                json!({}),
            )
            .await?;

        debug!(invoice_id = %invoice, "Posted invoice");
        Ok(())
    }

    /// Email an invoice to its customer using the stock invoice mail template.
    ///
    /// # Errors
    ///
    /// Returns `ErpError` if the template cannot be resolved or sending fails.
    #[instrument(skip(self))]
    pub async fn send_invoice_email(&self, invoice: InvoiceId) -> Result<(), ErpError> {
        // check_object_reference returns (model, res_id) for the xml id
        let (_, template_id): (String, i32) = self
            .execute_kw(
                "ir.model.data",
                "check_object_reference",
                json!(["account", "email_template_edi_invoice"]),
                json!({}),
            )
            .await?;

        let _: Value = self
            .execute_kw(
                "mail.template",
                "send_mail",
                json!([template_id, invoice.as_i32()]),
                json!({"force_send": true}),
            )
            .await?;

        debug!(invoice_id = %invoice, "Invoice email queued");
        Ok(())
    }
}
