//! Product catalog for dynamically-keyed form fields.
//!
//! Older order forms deliver products as `special_<id>` fields whose values
//! carry only quantity and option strings; the product's name and unit price
//! live in a lookup table on this side. The original handlers each carried
//! their own hard-coded copy of that table; here they are unified into one
//! built-in catalog that a deployment can override with a JSON file
//! (`FORMS_CATALOG_PATH`), e.g.:
//!
//! ```json
//! { "1001": { "name": "Gift Basket", "unit_price": "49.00" } }
//! ```

use std::collections::HashMap;
use std::path::Path;

use formbridge_core::Price;
use serde::Deserialize;
use thiserror::Error;

/// Errors loading a catalog override file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog entry {key} has a negative or unparseable price: {price}")]
    InvalidPrice { key: u32, price: String },
}

/// One catalog entry: the product's display name and unit price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub unit_price: Price,
}

/// File format for catalog overrides.
#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    unit_price: String,
}

/// Product lookup table keyed by the numeric id of a `special_<id>` field.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    entries: HashMap<u32, CatalogEntry>,
}

impl ProductCatalog {
    /// The built-in table, covering the product ids the original forms used.
    #[must_use]
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        for (key, name, price) in [
            (1001_u32, "Gift Basket", "49.00"),
            (1002, "Fruit Box", "32.50"),
            (1003, "Cheese Board", "58.00"),
            (1004, "Chocolate Assortment", "24.00"),
            (1005, "Wine Duo", "65.00"),
        ] {
            entries.insert(
                key,
                CatalogEntry {
                    name: name.to_string(),
                    unit_price: Price::parse_lenient(price).unwrap_or(Price::ZERO),
                },
            );
        }
        Self { entries }
    }

    /// An empty catalog, for tests.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The built-in table with entries from `path` merged over it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read or parsed, or if an
    /// entry carries an unusable price.
    pub fn with_overrides(path: &Path) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin();

        let raw = std::fs::read_to_string(path)?;
        let overrides: HashMap<u32, RawEntry> = serde_json::from_str(&raw)?;

        for (key, entry) in overrides {
            let unit_price = Price::parse_lenient(&entry.unit_price).ok_or_else(|| {
                CatalogError::InvalidPrice {
                    key,
                    price: entry.unit_price.clone(),
                }
            })?;
            catalog.entries.insert(
                key,
                CatalogEntry {
                    name: entry.name,
                    unit_price,
                },
            );
        }

        Ok(catalog)
    }

    /// Look up an entry by its numeric key.
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&CatalogEntry> {
        self.entries.get(&key)
    }

    /// Number of entries in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let catalog = ProductCatalog::builtin();
        let entry = catalog.get(1001).unwrap();
        assert_eq!(entry.name, "Gift Basket");
        assert_eq!(entry.unit_price, Price::parse_lenient("49.00").unwrap());
    }

    #[test]
    fn test_builtin_miss() {
        let catalog = ProductCatalog::builtin();
        assert!(catalog.get(9999).is_none());
    }

    #[test]
    fn test_overrides_merge_over_builtin() {
        let dir = std::env::temp_dir();
        let path = dir.join("formbridge_catalog_test.json");
        std::fs::write(
            &path,
            r#"{"1001": {"name": "Deluxe Gift Basket", "unit_price": "$59.00"},
                "2001": {"name": "Tea Sampler", "unit_price": "18.50"}}"#,
        )
        .unwrap();

        let catalog = ProductCatalog::with_overrides(&path).unwrap();
        assert_eq!(catalog.get(1001).unwrap().name, "Deluxe Gift Basket");
        assert_eq!(catalog.get(2001).unwrap().name, "Tea Sampler");
        // Untouched builtin entries survive
        assert!(catalog.get(1002).is_some());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_overrides_invalid_price() {
        let dir = std::env::temp_dir();
        let path = dir.join("formbridge_catalog_bad_price.json");
        std::fs::write(&path, r#"{"3001": {"name": "Broken", "unit_price": "n/a"}}"#).unwrap();

        let result = ProductCatalog::with_overrides(&path);
        assert!(matches!(
            result,
            Err(CatalogError::InvalidPrice { key: 3001, .. })
        ));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_overrides_missing_file() {
        let result = ProductCatalog::with_overrides(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
