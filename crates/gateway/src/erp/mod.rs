//! Typed client for the ERP's remote object API.
//!
//! The ERP exposes its business objects over JSON-RPC: a `common` service for
//! version pings and authentication, and an `object` service whose
//! `execute_kw` method runs a named method on a named model. This module
//! wraps the handful of models the gateway touches:
//!
//! - [`client`] - transport, session handling, and the generic `execute_kw`
//! - [`partners`] - customer records (`res.partner`) and country lookups
//! - [`products`] - product records (`product.product`)
//! - [`orders`] - sale orders (`sale.order`): create and confirm
//! - [`invoices`] - invoicing (`account.move`) and invoice email
//! - [`types`] - request/response value types

pub mod client;
pub mod invoices;
pub mod orders;
pub mod partners;
pub mod products;
pub mod types;

pub use client::ErpClient;
pub use types::{NewPartner, NewProduct, NewSaleOrder, PartnerRef, SaleOrderLine, ServerVersion};

use thiserror::Error;

/// Errors that can occur when talking to the ERP.
#[derive(Debug, Error)]
pub enum ErpError {
    /// HTTP transport failure.
    #[error("ERP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The ERP returned a JSON-RPC error object.
    #[error("ERP RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The ERP rejected the configured credentials.
    #[error("ERP authentication failed")]
    AuthenticationFailed,

    /// The ERP answered with a shape this client cannot use.
    #[error("unexpected ERP response: {0}")]
    UnexpectedResponse(String),
}
