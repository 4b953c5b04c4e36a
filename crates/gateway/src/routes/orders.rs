//! Order webhook handler.
//!
//! Receives a form submission, normalizes it, and drives the ERP sequence:
//! find-or-create the partner, find-or-create each product, create and
//! confirm the sale order, and (when enabled) create, post, and email an
//! invoice. Each remote call is awaited before the next one; nothing is
//! persisted locally.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};
use formbridge_core::{InvoiceId, PartnerId, PostalAddress, SaleOrderId};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::erp::{NewSaleOrder, SaleOrderLine};
use crate::error::AppError;
use crate::forms::{PayloadError, Submission, signature};
use crate::state::AppState;

/// Header carrying the webhook signature.
const SIGNATURE_HEADER: &str = "x-webhook-signature";
/// Header carrying the webhook timestamp.
const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";

/// Response for a processed order submission.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub partner_id: PartnerId,
    pub sale_order_id: SaleOrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<InvoiceId>,
}

/// Handle an order form submission.
///
/// POST /webhooks/forms/order
#[instrument(skip(state, headers, body), fields(request_id = tracing::field::Empty))]
pub async fn handle_order_submission(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    // Signature verification, when the deployment has a signing secret
    if let Some(secret) = &state.config().forms.webhook_secret {
        let timestamp = headers
            .get(TIMESTAMP_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing timestamp header".into()))?;
        let sig = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing signature header".into()))?;

        signature::verify_signature(secret, timestamp, &body, sig)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;
    }

    let payload = decode_body(&headers, &body)?;
    let submission = Submission::from_value(
        &payload,
        state.catalog(),
        &state.config().forms.placeholder_domain,
    )?;

    info!(
        submission_id = submission.submission_id.as_deref().unwrap_or("-"),
        customer = %submission.customer.name,
        lines = submission.lines.len(),
        "Processing order submission"
    );

    let erp = state.erp();

    let partner_id = erp.find_or_create_partner(&submission.customer).await?;

    let mut order_lines = Vec::with_capacity(submission.lines.len());
    for line in &submission.lines {
        let label = line.display_name();
        let product_id = erp
            .find_or_create_product(&label, line.unit_price.amount())
            .await?;
        order_lines.push(SaleOrderLine {
            product_id,
            quantity: line.quantity,
            price_unit: line.unit_price.amount(),
            label,
        });
    }

    let sale_order_id = erp
        .create_sale_order(NewSaleOrder {
            partner_id,
            note: build_order_note(&submission),
            lines: order_lines,
        })
        .await?;
    erp.confirm_sale_order(sale_order_id).await?;

    let invoice_id = if state.config().auto_invoice {
        let invoice_id = erp.create_invoice(sale_order_id).await?;
        erp.post_invoice(invoice_id).await?;

        if submission.customer.email_is_placeholder {
            warn!(
                invoice_id = %invoice_id,
                "Skipping invoice email: customer email is a generated placeholder"
            );
        } else {
            erp.send_invoice_email(invoice_id).await?;
        }
        Some(invoice_id)
    } else {
        None
    };

    info!(
        partner_id = %partner_id,
        sale_order_id = %sale_order_id,
        "Order submission processed"
    );

    Ok(Json(OrderResponse {
        success: true,
        partner_id,
        sale_order_id,
        invoice_id,
    }))
}

/// Decode the request body into a JSON payload.
///
/// The form service delivers either raw JSON or a form-encoded body with the
/// JSON nested in a `rawRequest` field; both land here as a `String`.
fn decode_body(headers: &HeaderMap, body: &str) -> Result<Value, PayloadError> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    let json_text = if is_form || body.starts_with("rawRequest=") {
        extract_raw_request(body)?
    } else {
        body.to_string()
    };

    serde_json::from_str(&json_text).map_err(|e| PayloadError::InvalidJson(e.to_string()))
}

/// Pull the `rawRequest` field out of a form-encoded body.
fn extract_raw_request(body: &str) -> Result<String, PayloadError> {
    let value = body
        .split('&')
        .find_map(|pair| pair.strip_prefix("rawRequest="))
        .ok_or_else(|| PayloadError::InvalidJson("missing rawRequest field".to_string()))?;

    // Form encoding uses '+' for spaces; restore them before percent-decoding
    let with_spaces = value.replace('+', " ");
    let decoded = urlencoding::decode(&with_spaces)
        .map_err(|e| PayloadError::InvalidJson(format!("bad rawRequest encoding: {e}")))?;

    Ok(decoded.into_owned())
}

/// Compose the free-text note for the sale order: customer notes, the
/// shipping address (which has no field of its own on the order), and the
/// form submission id for traceability.
fn build_order_note(submission: &Submission) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(notes) = &submission.customer.notes {
        parts.push(notes.clone());
    }
    if let Some(shipping) = &submission.customer.shipping {
        parts.push(format!("Ship to: {}", format_address(shipping)));
    }
    if let Some(id) = &submission.submission_id {
        parts.push(format!("Form submission: {id}"));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn format_address(address: &PostalAddress) -> String {
    [
        address.street.as_deref(),
        address.street2.as_deref(),
        address.city.as_deref(),
        address.state.as_deref(),
        address.zip.as_deref(),
        address.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ")
}
