//! Payload normalization: form products → order lines.
//!
//! Order forms deliver their product data in two shapes, sometimes both at
//! once:
//!
//! 1. a `products` array of objects with per-form field names, and
//! 2. dynamically-keyed fields like `special_1001` whose values are
//!    positional `item_N` maps or bare strings, with the product's identity
//!    living in the [`ProductCatalog`].
//!
//! The original handlers disagreed with each other about precedence and
//! defaults; this module is the single deterministic replacement. Tie-breaks:
//!
//! - A non-empty `products` array wins and dynamic keys are ignored.
//! - Array entries without any usable name are skipped.
//! - Quantity defaults to 1, unit price to zero.
//! - Dynamic keys are processed in ascending numeric order.
//! - `customOptions` entries are folded in lexicographic key order.
//!
//! Same payload + same catalog always yields the same lines in the same
//! order.

use formbridge_core::{OrderLine, Price};
use serde_json::Value;

use super::PayloadError;
use super::catalog::ProductCatalog;

/// Field names checked, in order, for a product's display name.
const NAME_KEYS: &[&str] = &["name", "productName", "title"];
/// Field names checked, in order, for a quantity.
const QUANTITY_KEYS: &[&str] = &["quantity", "qty", "count"];
/// Field names checked, in order, for a unit price.
const PRICE_KEYS: &[&str] = &["price", "unitPrice", "unit_price", "amount"];

/// Prefix of dynamically-keyed product fields.
const DYNAMIC_KEY_PREFIX: &str = "special_";

/// Extract the normalized order lines from a submission payload.
///
/// # Errors
///
/// Returns [`PayloadError::NotAnObject`] when the payload root is not an
/// object, and [`PayloadError::NoOrderLines`] when no usable line can be
/// extracted from either product shape.
pub fn normalize_lines(
    payload: &Value,
    catalog: &ProductCatalog,
) -> Result<Vec<OrderLine>, PayloadError> {
    let root = payload.as_object().ok_or(PayloadError::NotAnObject)?;

    if let Some(products) = root.get("products").and_then(Value::as_array)
        && !products.is_empty()
    {
        let lines = lines_from_array(products);
        return if lines.is_empty() {
            Err(PayloadError::NoOrderLines)
        } else {
            Ok(lines)
        };
    }

    let lines = lines_from_dynamic_keys(root, catalog);
    if lines.is_empty() {
        Err(PayloadError::NoOrderLines)
    } else {
        Ok(lines)
    }
}

// =============================================================================
// Array form
// =============================================================================

fn lines_from_array(products: &[Value]) -> Vec<OrderLine> {
    products.iter().filter_map(line_from_entry).collect()
}

fn line_from_entry(entry: &Value) -> Option<OrderLine> {
    let obj = entry.as_object()?;

    let name = first_string(obj, NAME_KEYS)?;
    let quantity = first_quantity(obj, QUANTITY_KEYS).unwrap_or(1);
    let unit_price = first_price(obj, PRICE_KEYS).unwrap_or(Price::ZERO);

    let mut options = Vec::new();
    if let Some(values) = obj.get("options").and_then(Value::as_array) {
        options.extend(
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
    }
    if let Some(custom) = obj.get("customOptions").and_then(Value::as_object) {
        // Lexicographic key order keeps folded options deterministic
        let mut keys: Vec<&String> = custom.keys().collect();
        keys.sort();
        for key in keys {
            if let Some(value) = custom.get(key).and_then(Value::as_str) {
                let value = value.trim();
                if !value.is_empty() {
                    options.push(format!("{key}: {value}"));
                }
            }
        }
    }

    Some(OrderLine {
        name,
        quantity,
        unit_price,
        options,
    })
}

// =============================================================================
// Dynamic-key form
// =============================================================================

fn lines_from_dynamic_keys(
    root: &serde_json::Map<String, Value>,
    catalog: &ProductCatalog,
) -> Vec<OrderLine> {
    let mut keyed: Vec<(u32, &String, &Value)> = root
        .iter()
        .filter_map(|(key, value)| {
            let id = key
                .strip_prefix(DYNAMIC_KEY_PREFIX)
                .and_then(|suffix| suffix.parse::<u32>().ok())?;
            Some((id, key, value))
        })
        .collect();
    keyed.sort_by_key(|(id, _, _)| *id);

    keyed
        .into_iter()
        .map(|(id, key, value)| line_from_dynamic(id, key, value, catalog))
        .collect()
}

fn line_from_dynamic(id: u32, raw_key: &str, value: &Value, catalog: &ProductCatalog) -> OrderLine {
    let entry = catalog.get(id);

    let mut quantity: Option<u32> = None;
    let mut options: Vec<String> = Vec::new();
    let mut name_override: Option<String> = None;
    let mut price_override: Option<Price> = None;

    match value {
        Value::Object(obj) => {
            // Positional item_N fields: item_0 is the quantity when it parses
            // as a positive integer, everything else is an option string.
            let mut index = 0_u32;
            while let Some(item) = obj.get(&format!("item_{index}")) {
                let text = value_as_text(item);
                if index == 0
                    && let Some(qty) = parse_positive_int(&text)
                {
                    quantity = Some(qty);
                } else if !text.is_empty() {
                    options.push(text);
                }
                index += 1;
            }

            // Explicit fields override positional and catalog values
            if let Some(qty) = first_quantity(obj, QUANTITY_KEYS) {
                quantity = Some(qty);
            }
            name_override = first_string(obj, NAME_KEYS);
            price_override = first_price(obj, PRICE_KEYS);
        }
        Value::String(s) => {
            let text = s.trim();
            if let Some(qty) = parse_positive_int(text) {
                quantity = Some(qty);
            } else if !text.is_empty() {
                options.push(text.to_string());
            }
        }
        Value::Number(n) => {
            if let Some(qty) = n.as_u64().and_then(|q| u32::try_from(q).ok())
                && qty > 0
            {
                quantity = Some(qty);
            }
        }
        _ => {}
    }

    let name = name_override
        .or_else(|| entry.map(|e| e.name.clone()))
        .unwrap_or_else(|| raw_key.to_string());
    let unit_price = price_override
        .or_else(|| entry.map(|e| e.unit_price))
        .unwrap_or(Price::ZERO);

    OrderLine {
        name,
        quantity: quantity.unwrap_or(1),
        unit_price,
        options,
    }
}

// =============================================================================
// Field helpers
// =============================================================================

/// First non-empty string under any of `keys`.
fn first_string(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// First positive integer (number or numeric string) under any of `keys`.
fn first_quantity(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<u32> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| match value {
            Value::Number(n) => n
                .as_u64()
                .and_then(|q| u32::try_from(q).ok())
                .filter(|q| *q > 0),
            Value::String(s) => parse_positive_int(s.trim()),
            _ => None,
        })
}

/// First parseable price under any of `keys`.
fn first_price(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<Price> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(Price::from_json)
}

fn parse_positive_int(text: &str) -> Option<u32> {
    text.parse::<u32>().ok().filter(|q| *q > 0)
}

/// Render a positional item as option text. Non-scalar items are dropped.
fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
