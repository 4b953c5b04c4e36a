//! Request and response value types for the ERP object API.
//!
//! Create-style calls take a values map; the builders here produce those maps
//! as `serde_json::Value`, omitting unset fields (the ERP treats a missing
//! key and an empty one the same way). Monetary amounts are sent as JSON
//! numbers, not the string form `rust_decimal` serializes to by default.

use formbridge_core::{CountryId, PartnerId, ProductId};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Server version info from the `common` service, used for readiness pings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerVersion {
    pub server_version: String,
}

/// A partner row as returned by `search_read` on `res.partner`.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerRef {
    pub id: i32,
    pub name: String,
    /// The ERP encodes an unset email as `false`, which deserializes to None.
    #[serde(default, deserialize_with = "false_as_none")]
    pub email: Option<String>,
}

/// Values for creating a `res.partner` record.
#[derive(Debug, Clone, Default)]
pub struct NewPartner {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country_id: Option<CountryId>,
}

impl NewPartner {
    /// The values map for the `create` call.
    #[must_use]
    pub fn into_values(self) -> Value {
        let mut values = Map::new();
        values.insert("name".to_string(), json!(self.name));
        values.insert("email".to_string(), json!(self.email));
        insert_opt(&mut values, "phone", self.phone);
        insert_opt(&mut values, "street", self.street);
        insert_opt(&mut values, "street2", self.street2);
        insert_opt(&mut values, "city", self.city);
        insert_opt(&mut values, "zip", self.zip);
        if let Some(country) = self.country_id {
            values.insert("country_id".to_string(), json!(country.as_i32()));
        }
        Value::Object(values)
    }
}

/// Values for creating a `product.product` record.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub list_price: Decimal,
}

impl NewProduct {
    /// The values map for the `create` call.
    #[must_use]
    pub fn into_values(self) -> Value {
        json!({
            "name": self.name,
            "list_price": decimal_number(self.list_price),
        })
    }
}

/// One line of a sale order to be created.
#[derive(Debug, Clone)]
pub struct SaleOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_unit: Decimal,
    /// The line label shown on the order (display name with options folded).
    pub label: String,
}

/// Values for creating a `sale.order` record with its lines.
#[derive(Debug, Clone)]
pub struct NewSaleOrder {
    pub partner_id: PartnerId,
    pub note: Option<String>,
    pub lines: Vec<SaleOrderLine>,
}

impl NewSaleOrder {
    /// The values map for the `create` call. Lines use the one2many
    /// `(0, 0, values)` command triple the object API expects.
    #[must_use]
    pub fn into_values(self) -> Value {
        let lines: Vec<Value> = self
            .lines
            .into_iter()
            .map(|line| {
                json!([0, 0, {
                    "product_id": line.product_id.as_i32(),
                    "product_uom_qty": line.quantity,
                    "price_unit": decimal_number(line.price_unit),
                    "name": line.label,
                }])
            })
            .collect();

        let mut values = Map::new();
        values.insert("partner_id".to_string(), json!(self.partner_id.as_i32()));
        insert_opt(&mut values, "note", self.note);
        values.insert("order_line".to_string(), Value::Array(lines));
        Value::Object(values)
    }
}

/// Serialize a decimal as a JSON number (the ERP rejects string amounts).
fn decimal_number(amount: Decimal) -> Value {
    amount
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or(json!(0.0), Value::Number)
}

fn insert_opt(values: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        values.insert(key.to_string(), json!(value));
    }
}

/// The ERP returns `false` for unset char fields; map that to `None`.
fn false_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_partner_omits_unset_fields() {
        let partner = NewPartner {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            street: Some("12 Analytical Way".to_string()),
            ..NewPartner::default()
        };

        let values = partner.into_values();
        assert_eq!(values["name"], "Ada Lovelace");
        assert_eq!(values["street"], "12 Analytical Way");
        assert!(values.get("phone").is_none());
        assert!(values.get("country_id").is_none());
    }

    #[test]
    fn test_new_partner_country_as_integer() {
        let partner = NewPartner {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            country_id: Some(CountryId::new(233)),
            ..NewPartner::default()
        };

        assert_eq!(partner.into_values()["country_id"], 233);
    }

    #[test]
    fn test_new_product_price_is_a_number() {
        let product = NewProduct {
            name: "Gift Basket".to_string(),
            list_price: Decimal::from_str("49.00").unwrap(),
        };

        let values = product.into_values();
        assert!(values["list_price"].is_number());
        assert!((values["list_price"].as_f64().unwrap() - 49.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sale_order_line_commands() {
        let order = NewSaleOrder {
            partner_id: PartnerId::new(7),
            note: Some("ring twice".to_string()),
            lines: vec![SaleOrderLine {
                product_id: ProductId::new(11),
                quantity: 2,
                price_unit: Decimal::from_str("24.00").unwrap(),
                label: "Tote Bag (Blue)".to_string(),
            }],
        };

        let values = order.into_values();
        assert_eq!(values["partner_id"], 7);
        assert_eq!(values["note"], "ring twice");

        let line = &values["order_line"][0];
        assert_eq!(line[0], 0);
        assert_eq!(line[1], 0);
        assert_eq!(line[2]["product_id"], 11);
        assert_eq!(line[2]["product_uom_qty"], 2);
        assert_eq!(line[2]["name"], "Tote Bag (Blue)");
    }

    #[test]
    fn test_sale_order_without_note() {
        let order = NewSaleOrder {
            partner_id: PartnerId::new(7),
            note: None,
            lines: vec![],
        };

        let values = order.into_values();
        assert!(values.get("note").is_none());
        assert_eq!(values["order_line"], json!([]));
    }

    #[test]
    fn test_partner_ref_false_email() {
        let row: PartnerRef =
            serde_json::from_value(json!({"id": 5, "name": "Ada", "email": false})).unwrap();
        assert!(row.email.is_none());

        let row: PartnerRef =
            serde_json::from_value(json!({"id": 5, "name": "Ada", "email": "a@b.c"})).unwrap();
        assert_eq!(row.email.as_deref(), Some("a@b.c"));
    }
}
