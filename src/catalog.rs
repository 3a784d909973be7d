//! Menu Catalog
//!
//! Products offered on the menu pages, loaded from YAML:
//!
//! ```yaml
//! products:
//!   pao-frances:
//!     name: Pão francês
//!     price: "0.75 BRL"
//!     description: Crocante, assado na hora
//! ```

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{items::LineItem, pricing::is_storable_price};

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Currency other than BRL
    #[error("Unsupported currency code: {0}")]
    UnsupportedCurrency(String),

    /// No product with the given key
    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: FxHashMap<String, ProductFixture>,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,
    price: String,
    #[serde(default)]
    description: Option<String>,
}

/// A product on the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Catalog key, e.g. `pao-frances`
    pub key: String,

    /// Display name, which is also the cart identity
    pub name: String,

    /// Unit price in reais
    pub price: Decimal,

    /// Display description
    pub description: Option<String>,
}

impl Product {
    /// Line item added to the cart when this product is chosen.
    pub fn to_line_item(&self) -> LineItem {
        let item = LineItem::new(self.name.clone(), self.price);

        match &self.description {
            Some(description) => item.with_description(description.clone()),
            None => item,
        }
    }
}

/// Menu catalog keyed by product key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: FxHashMap<String, Product>,
}

impl Catalog {
    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a price is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or a price is invalid.
    pub fn from_yaml(contents: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(contents)?;

        let products = fixture
            .products
            .into_iter()
            .map(|(key, product)| {
                let price = parse_price(&product.price)?;

                Ok((
                    key.clone(),
                    Product {
                        key,
                        name: product.name,
                        price,
                        description: product.description,
                    },
                ))
            })
            .collect::<Result<_, CatalogError>>()?;

        Ok(Self { products })
    }

    /// Get a product by its key
    pub fn get(&self, key: &str) -> Option<&Product> {
        self.products.get(key)
    }

    /// Line item for the product with the given key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if no product has that key.
    pub fn line_item(&self, key: &str) -> Result<LineItem, CatalogError> {
        self.get(key)
            .map(Product::to_line_item)
            .ok_or_else(|| CatalogError::ProductNotFound(key.to_string()))
    }

    /// Products sorted by key.
    pub fn products(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.values().collect();
        products.sort_by(|a, b| a.key.cmp(&b.key));
        products
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog has no products
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Parse a price such as `"5.00"` or `"5.00 BRL"`.
///
/// # Errors
///
/// Returns an error if the amount is not a non-negative decimal in whole centavos with at
/// most 15 significant digits, or the currency is not BRL.
pub fn parse_price(s: &str) -> Result<Decimal, CatalogError> {
    let mut parts = s.split_whitespace();

    let amount = parts
        .next()
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    if (amount.is_sign_negative() && !amount.is_zero()) || !is_storable_price(amount) {
        return Err(CatalogError::InvalidPrice(s.to_string()));
    }

    match (parts.next(), parts.next()) {
        (None | Some("BRL"), None) => Ok(amount),
        (Some(other), None) => Err(CatalogError::UnsupportedCurrency(other.to_string())),
        _ => Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT [BRL]', got: {s}"
        ))),
    }
}
