//! Normalized customer details.

use serde::{Deserialize, Serialize};

use super::email::Email;

/// A postal address as extracted from a form submission.
///
/// Form services deliver addresses either as one free-text blob (which lands
/// in `street`) or as a structured object; all fields are optional because
/// either shape can be partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PostalAddress {
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    /// Country as free text; resolved to a remote country id at order time.
    pub country: Option<String>,
}

impl PostalAddress {
    /// Whether no field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.street2.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.country.is_none()
    }
}

/// Normalized buyer details from a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Display name, always present (submissions without one are rejected).
    pub name: String,
    /// Contact email. When the submission carried none (or an invalid one),
    /// this is a generated placeholder and `email_is_placeholder` is set.
    pub email: Email,
    /// Marks `email` as generated rather than submitted. Placeholder
    /// customers never receive outbound mail.
    pub email_is_placeholder: bool,
    pub phone: Option<String>,
    pub billing: Option<PostalAddress>,
    pub shipping: Option<PostalAddress>,
    /// Free-text order notes.
    pub notes: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_empty() {
        assert!(PostalAddress::default().is_empty());

        let addr = PostalAddress {
            city: Some("Portland".to_string()),
            ..PostalAddress::default()
        };
        assert!(!addr.is_empty());
    }
}
