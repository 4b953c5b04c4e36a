//! Submission parsing: payload → normalized customer + order lines.
//!
//! Customer fields arrive under different names depending on which form the
//! submission came from (`name` vs `{first, last}`, `phone` vs
//! `{area, phone}`, address as one blob vs a structured object). This module
//! reduces them to one [`Customer`] and wraps the normalizer's output into a
//! [`Submission`].

use formbridge_core::{Customer, Email, OrderLine, PostalAddress};
use rand::distr::{Alphanumeric, SampleString};
use serde_json::Value;

use super::PayloadError;
use super::catalog::ProductCatalog;
use super::normalize::normalize_lines;

/// Maximum length of the name-derived slug in placeholder emails.
const PLACEHOLDER_SLUG_MAX: usize = 24;

/// A parsed and normalized form submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The form service's submission id, when present.
    pub submission_id: Option<String>,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
}

impl Submission {
    /// Parse a raw webhook payload into a normalized submission.
    ///
    /// `placeholder_domain` is used when the payload carries no valid email.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when the payload root is not an object, no
    /// customer name is present, or no order lines can be extracted.
    pub fn from_value(
        payload: &Value,
        catalog: &ProductCatalog,
        placeholder_domain: &str,
    ) -> Result<Self, PayloadError> {
        let root = payload.as_object().ok_or(PayloadError::NotAnObject)?;

        let name = extract_name(root).ok_or(PayloadError::MissingCustomerName)?;
        let (email, email_is_placeholder) = extract_email(root, &name, placeholder_domain);

        let customer = Customer {
            phone: extract_phone(root),
            billing: extract_address(root, &["billing_address", "address"]),
            shipping: extract_address(root, &["shipping_address"]),
            notes: extract_notes(root),
            name,
            email,
            email_is_placeholder,
        };

        let lines = normalize_lines(payload, catalog)?;

        Ok(Self {
            submission_id: root
                .get("submission_id")
                .or_else(|| root.get("submissionID"))
                .and_then(Value::as_str)
                .map(String::from),
            customer,
            lines,
        })
    }
}

// =============================================================================
// Customer field extraction
// =============================================================================

fn extract_name(root: &serde_json::Map<String, Value>) -> Option<String> {
    for key in ["name", "fullName", "full_name", "customer_name"] {
        match root.get(key) {
            Some(Value::String(s)) => {
                let s = s.trim();
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            }
            Some(Value::Object(parts)) => {
                // {"first": "...", "last": "..."} shape
                let first = parts.get("first").and_then(Value::as_str).unwrap_or("");
                let last = parts.get("last").and_then(Value::as_str).unwrap_or("");
                let joined = format!("{} {}", first.trim(), last.trim());
                let joined = joined.trim();
                if !joined.is_empty() {
                    return Some(joined.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn extract_email(
    root: &serde_json::Map<String, Value>,
    customer_name: &str,
    placeholder_domain: &str,
) -> (Email, bool) {
    let submitted = root
        .get("email")
        .and_then(Value::as_str)
        .and_then(|raw| Email::parse(raw).ok());

    match submitted {
        Some(email) => (email, false),
        None => (placeholder_email(customer_name, placeholder_domain), true),
    }
}

/// Generate a placeholder email for submissions without a usable one.
///
/// The local part is `orders+<slug>-<suffix>`: the slug comes from the
/// customer name, the random suffix keeps repeat buyers from colliding on
/// one partner record.
fn placeholder_email(customer_name: &str, domain: &str) -> Email {
    let slug = name_slug(customer_name);
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 4)
        .to_lowercase();

    let address = format!("orders+{slug}-{suffix}@{domain}");
    // The slug and suffix are alphanumeric-and-dots by construction, so this
    // can only fail on an unusable configured domain; fall back to the default.
    Email::parse(&address).unwrap_or_else(|_| {
        Email::parse(&format!("orders+{suffix}@placeholder.invalid"))
            .expect("static placeholder address is valid")
    })
}

fn name_slug(name: &str) -> String {
    let mut slug = String::new();
    let mut last_was_dot = true;
    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_dot = false;
        } else if !last_was_dot {
            slug.push('.');
            last_was_dot = true;
        }
        if slug.len() >= PLACEHOLDER_SLUG_MAX {
            break;
        }
    }
    let slug = slug.trim_matches('.').to_string();
    if slug.is_empty() {
        "customer".to_string()
    } else {
        slug
    }
}

fn extract_phone(root: &serde_json::Map<String, Value>) -> Option<String> {
    match root.get("phone") {
        Some(Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(Value::Object(parts)) => {
            if let Some(full) = parts.get("full").and_then(Value::as_str) {
                let full = full.trim();
                if !full.is_empty() {
                    return Some(full.to_string());
                }
            }
            let area = parts.get("area").and_then(Value::as_str).unwrap_or("");
            let number = parts.get("phone").and_then(Value::as_str).unwrap_or("");
            let joined = format!("{} {}", area.trim(), number.trim());
            let joined = joined.trim();
            (!joined.is_empty()).then(|| joined.to_string())
        }
        _ => None,
    }
}

fn extract_address(
    root: &serde_json::Map<String, Value>,
    keys: &[&str],
) -> Option<PostalAddress> {
    let value = keys.iter().find_map(|key| root.get(*key))?;

    let address = match value {
        // A bare string is stored as the street line unchanged
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            PostalAddress {
                street: Some(s.to_string()),
                ..PostalAddress::default()
            }
        }
        Value::Object(obj) => PostalAddress {
            street: string_field(obj, &["street", "addr_line1"]),
            street2: string_field(obj, &["street2", "addr_line2"]),
            city: string_field(obj, &["city"]),
            state: string_field(obj, &["state"]),
            zip: string_field(obj, &["postal", "zip"]),
            country: string_field(obj, &["country"]),
        },
        _ => return None,
    };

    (!address.is_empty()).then_some(address)
}

fn extract_notes(root: &serde_json::Map<String, Value>) -> Option<String> {
    ["notes", "special_instructions", "comments"]
        .iter()
        .filter_map(|key| root.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

fn string_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOMAIN: &str = "placeholder.invalid";

    fn parse(payload: &Value) -> Submission {
        Submission::from_value(payload, &ProductCatalog::builtin(), DOMAIN).unwrap()
    }

    #[test]
    fn test_full_submission() {
        let payload = json!({
            "submission_id": "58214",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "555-0100",
            "billing_address": {
                "addr_line1": "12 Analytical Way",
                "city": "London",
                "postal": "N1 9GU",
                "country": "United Kingdom"
            },
            "notes": "ring the bell twice",
            "products": [{"name": "Gift Basket", "quantity": 1, "price": "49.00"}]
        });

        let submission = parse(&payload);
        assert_eq!(submission.submission_id.as_deref(), Some("58214"));
        assert_eq!(submission.customer.name, "Ada Lovelace");
        assert_eq!(submission.customer.email.as_str(), "ada@example.com");
        assert!(!submission.customer.email_is_placeholder);
        assert_eq!(submission.customer.phone.as_deref(), Some("555-0100"));
        let billing = submission.customer.billing.unwrap();
        assert_eq!(billing.street.as_deref(), Some("12 Analytical Way"));
        assert_eq!(billing.country.as_deref(), Some("United Kingdom"));
        assert!(submission.customer.shipping.is_none());
        assert_eq!(submission.customer.notes.as_deref(), Some("ring the bell twice"));
        assert_eq!(submission.lines.len(), 1);
    }

    #[test]
    fn test_split_name_shape() {
        let payload = json!({
            "name": {"first": "Grace", "last": "Hopper"},
            "email": "grace@example.com",
            "special_1001": "1"
        });

        assert_eq!(parse(&payload).customer.name, "Grace Hopper");
    }

    #[test]
    fn test_missing_name_rejected() {
        let payload = json!({"email": "x@example.com", "special_1001": "1"});
        let result = Submission::from_value(&payload, &ProductCatalog::builtin(), DOMAIN);
        assert!(matches!(result, Err(PayloadError::MissingCustomerName)));
    }

    #[test]
    fn test_missing_email_gets_placeholder() {
        let payload = json!({"name": "Ada Lovelace", "special_1001": "1"});

        let submission = parse(&payload);
        assert!(submission.customer.email_is_placeholder);
        let email = submission.customer.email.as_str();
        assert!(email.starts_with("orders+ada.lovelace-"), "got {email}");
        assert!(email.ends_with("@placeholder.invalid"), "got {email}");
    }

    #[test]
    fn test_invalid_email_gets_placeholder() {
        let payload = json!({
            "name": "Ada",
            "email": "not-an-email",
            "special_1001": "1"
        });

        assert!(parse(&payload).customer.email_is_placeholder);
    }

    #[test]
    fn test_phone_object_shapes() {
        let payload = json!({
            "name": "Ada",
            "phone": {"area": "415", "phone": "555 0100"},
            "special_1001": "1"
        });
        assert_eq!(parse(&payload).customer.phone.as_deref(), Some("415 555 0100"));

        let payload = json!({
            "name": "Ada",
            "phone": {"full": "+1 415 555 0100"},
            "special_1001": "1"
        });
        assert_eq!(
            parse(&payload).customer.phone.as_deref(),
            Some("+1 415 555 0100")
        );
    }

    #[test]
    fn test_address_as_string() {
        let payload = json!({
            "name": "Ada",
            "address": "12 Analytical Way, London",
            "special_1001": "1"
        });

        let billing = parse(&payload).customer.billing.unwrap();
        assert_eq!(billing.street.as_deref(), Some("12 Analytical Way, London"));
        assert!(billing.city.is_none());
    }

    #[test]
    fn test_shipping_address_separate() {
        let payload = json!({
            "name": "Ada",
            "billing_address": {"city": "London"},
            "shipping_address": {"city": "Cambridge"},
            "special_1001": "1"
        });

        let customer = parse(&payload).customer;
        assert_eq!(customer.billing.unwrap().city.as_deref(), Some("London"));
        assert_eq!(customer.shipping.unwrap().city.as_deref(), Some("Cambridge"));
    }

    #[test]
    fn test_name_slug_shapes() {
        assert_eq!(name_slug("Ada Lovelace"), "ada.lovelace");
        assert_eq!(name_slug("  J.  Doe  "), "j.doe");
        assert_eq!(name_slug("魔法"), "customer");
        assert!(name_slug(&"x".repeat(100)).len() <= PLACEHOLDER_SLUG_MAX);
    }

    #[test]
    fn test_placeholder_emails_differ() {
        let a = placeholder_email("Ada", DOMAIN);
        let b = placeholder_email("Ada", DOMAIN);
        // Random suffix keeps repeat submissions on distinct addresses
        assert_ne!(a, b);
    }
}
