//! Inbound form-submission handling.
//!
//! The form service delivers order submissions as deeply nested,
//! inconsistently-shaped JSON. This module owns the ad-hoc parsing of that
//! payload into normalized [`formbridge_core`] types:
//!
//! - [`catalog`] - the product name/price table for dynamically-keyed fields
//! - [`normalize`] - payload → order lines, with the documented tie-breaks
//! - [`submission`] - payload → customer details + submission wrapper
//! - [`signature`] - optional webhook signature verification

pub mod catalog;
pub mod normalize;
pub mod signature;
pub mod submission;

pub use catalog::ProductCatalog;
pub use submission::Submission;

use thiserror::Error;

/// Errors produced while parsing or normalizing an inbound payload.
///
/// All of these are the webhook caller's fault and map to HTTP 400.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The request body was not valid JSON.
    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),

    /// The payload root is not a JSON object.
    #[error("payload root must be a JSON object")]
    NotAnObject,

    /// No customer name could be extracted.
    #[error("submission carries no customer name")]
    MissingCustomerName,

    /// No order lines could be extracted.
    #[error("submission carries no order lines")]
    NoOrderLines,
}
