//! Unit price type with lenient parsing.
//!
//! Form services deliver prices in whatever shape the form author configured:
//! JSON numbers, bare numeric strings, or display strings with currency
//! symbols and thousands separators (`"$1,299.95"`). The normalizer needs a
//! single forgiving parse that either yields a usable amount or signals the
//! caller to fall back to a default, so every constructor here returns
//! `Option` rather than an error.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency symbols stripped before numeric parsing.
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£'];

/// A non-negative unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price, the fallback when a payload carries no usable amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount. Returns `None` for negative amounts.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return None;
        }
        Some(Self(amount))
    }

    /// Parse a price from the messy strings form payloads carry.
    ///
    /// Accepted inputs, after trimming: plain decimals (`"12.5"`), integers
    /// (`"1299"`), and display strings with a leading/embedded currency
    /// symbol and separators (`"$1,299.95"`, `"€ 12,50"`).
    ///
    /// Separator rule: when both `.` and `,` are present, commas are
    /// thousands separators and are dropped. A lone comma followed by exactly
    /// two digits at the end is a decimal separator; any other commas are
    /// dropped as thousands separators.
    ///
    /// Returns `None` for empty, non-numeric, or negative input.
    #[must_use]
    pub fn parse_lenient(input: &str) -> Option<Self> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return None;
        }

        let normalized = if cleaned.contains('.') {
            cleaned.replace(',', "")
        } else if let Some(pos) = cleaned.rfind(',') {
            let decimals = cleaned.len() - pos - 1;
            if decimals == 2 && cleaned.matches(',').count() == 1 {
                // "12,50" - European decimal separator
                cleaned.replacen(',', ".", 1)
            } else {
                cleaned.replace(',', "")
            }
        } else {
            cleaned
        };

        Decimal::from_str(&normalized).ok().and_then(Self::new)
    }

    /// Extract a price from a JSON value: a number, or a string parsed
    /// leniently. Anything else yields `None`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::new(Decimal::from(i))
                } else {
                    n.as_f64()
                        .and_then(|f| Decimal::try_from(f).ok())
                        .and_then(Self::new)
                }
            }
            serde_json::Value::String(s) => Self::parse_lenient(s),
            _ => None,
        }
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this price is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain_decimal() {
        assert_eq!(Price::parse_lenient("12.5").unwrap().amount(), dec("12.5"));
        assert_eq!(Price::parse_lenient("1299").unwrap().amount(), dec("1299"));
        assert_eq!(Price::parse_lenient("0").unwrap().amount(), dec("0"));
    }

    #[test]
    fn test_parse_currency_symbols() {
        assert_eq!(
            Price::parse_lenient("$1,299.95").unwrap().amount(),
            dec("1299.95")
        );
        assert_eq!(Price::parse_lenient("€ 12.50").unwrap().amount(), dec("12.50"));
        assert_eq!(Price::parse_lenient("£7").unwrap().amount(), dec("7"));
    }

    #[test]
    fn test_parse_european_decimal_comma() {
        assert_eq!(Price::parse_lenient("12,50").unwrap().amount(), dec("12.50"));
    }

    #[test]
    fn test_parse_thousands_commas() {
        assert_eq!(
            Price::parse_lenient("1,299,000").unwrap().amount(),
            dec("1299000")
        );
        // Both separators present: commas are thousands separators
        assert_eq!(
            Price::parse_lenient("1,299.95").unwrap().amount(),
            dec("1299.95")
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Price::parse_lenient("").is_none());
        assert!(Price::parse_lenient("   ").is_none());
        assert!(Price::parse_lenient("free").is_none());
        assert!(Price::parse_lenient("$").is_none());
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(Price::parse_lenient("-5").is_none());
        assert!(Price::new(dec("-0.01")).is_none());
    }

    #[test]
    fn test_from_json_number() {
        assert_eq!(Price::from_json(&json!(42)).unwrap().amount(), dec("42"));
        assert_eq!(Price::from_json(&json!(9.99)).unwrap().amount(), dec("9.99"));
    }

    #[test]
    fn test_from_json_string() {
        assert_eq!(
            Price::from_json(&json!("$15.00")).unwrap().amount(),
            dec("15.00")
        );
    }

    #[test]
    fn test_from_json_other_shapes() {
        assert!(Price::from_json(&json!(null)).is_none());
        assert!(Price::from_json(&json!([1])).is_none());
        assert!(Price::from_json(&json!({"amount": 1})).is_none());
        assert!(Price::from_json(&json!(-3)).is_none());
    }

    #[test]
    fn test_zero() {
        assert!(Price::ZERO.is_zero());
        assert!(!Price::parse_lenient("1").unwrap().is_zero());
    }
}
