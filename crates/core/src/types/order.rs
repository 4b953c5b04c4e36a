//! Normalized order line.

use serde::{Deserialize, Serialize};

use super::price::Price;

/// One normalized line of an order submission.
///
/// This is the output of the payload normalizer: whatever shape the form
/// service delivered (a products array, or dynamically-keyed product fields),
/// every line ends up as a name, a quantity, a unit price, and a list of
/// free-text option strings (color, size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product display name, without options.
    pub name: String,
    /// Ordered quantity, always at least 1.
    pub quantity: u32,
    /// Unit price; zero when the payload carried no usable amount.
    pub unit_price: Price,
    /// Free-text option strings, in payload order.
    pub options: Vec<String>,
}

impl OrderLine {
    /// The display name with options folded in, e.g. `"Tote Bag (Blue, Large)"`.
    ///
    /// This is the name used for the ERP product record and the sale order
    /// line label, so each option combination gets its own product.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.options.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.options.join(", "))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_without_options() {
        let line = OrderLine {
            name: "Tote Bag".to_string(),
            quantity: 1,
            unit_price: Price::ZERO,
            options: vec![],
        };
        assert_eq!(line.display_name(), "Tote Bag");
    }

    #[test]
    fn test_display_name_folds_options() {
        let line = OrderLine {
            name: "Tote Bag".to_string(),
            quantity: 2,
            unit_price: Price::parse_lenient("24.00").unwrap(),
            options: vec!["Blue".to_string(), "Large".to_string()],
        };
        assert_eq!(line.display_name(), "Tote Bag (Blue, Large)");
    }
}
