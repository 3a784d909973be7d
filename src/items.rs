//! Items

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::pricing::{PricingError, is_storable_price};

/// Errors raised while turning a raw item payload into a [`LineItem`].
#[derive(Debug, Error)]
pub enum ItemError {
    /// The payload is not a JSON object with at least a name and a price.
    #[error("Failed to parse item payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The item name is empty or whitespace.
    #[error("Item name cannot be blank")]
    BlankName,

    /// The unit price is below zero.
    #[error("Item {name} has a negative price: {price}")]
    NegativePrice {
        /// Item name
        name: String,

        /// Offending price
        price: Decimal,
    },

    /// The unit price has sub-centavo precision or too many digits to store exactly.
    #[error(
        "Item {name} has an unsupported price {price}: use whole centavos and at most 15 significant digits"
    )]
    UnstorablePrice {
        /// Item name
        name: String,

        /// Offending price
        price: Decimal,
    },
}

/// One product entry in a cart, identified by its exact name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    name: String,

    #[serde(
        serialize_with = "serialize_price",
        deserialize_with = "rust_decimal::serde::float::deserialize"
    )]
    price: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
    quantity: u32,
}

impl LineItem {
    /// Creates a new item with the given name and unit price and a quantity of 1.
    ///
    /// The price is not checked; see [`is_storable_price`] for what survives a save/load.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            description: None,
            quantity: 1,
        }
    }

    /// Sets the display description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the quantity. Zero is raised to 1.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// Parses an item from the JSON payload attached to an "add to cart" trigger,
    /// e.g. `{"name": "Pão", "price": 5.0, "description": "Francês"}`.
    ///
    /// Fields other than `name`, `price`, `description` and `quantity` are ignored.
    ///
    /// # Errors
    ///
    /// - [`ItemError::Json`]: the payload is not valid JSON or lacks a name or price.
    /// - [`ItemError::BlankName`]: the name is empty after trimming.
    /// - [`ItemError::NegativePrice`]: the price is below zero.
    /// - [`ItemError::UnstorablePrice`]: the price is not whole centavos or has too many
    ///   digits.
    pub fn from_json(payload: &str) -> Result<Self, ItemError> {
        let item: LineItem = serde_json::from_str(payload)?;

        if item.name.trim().is_empty() {
            return Err(ItemError::BlankName);
        }

        if item.price.is_sign_negative() && !item.price.is_zero() {
            return Err(ItemError::NegativePrice {
                name: item.name,
                price: item.price,
            });
        }

        if !is_storable_price(item.price) {
            return Err(ItemError::UnstorablePrice {
                name: item.name,
                price: item.price,
            });
        }

        Ok(item)
    }

    /// Returns the item name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Returns the description, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the quantity, always at least 1
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the product exceeds the decimal range.
    pub fn line_total(&self) -> Result<Decimal, PricingError> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(PricingError::Overflow)
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
    }
}

/// Writes the price as the nearest `f64` to its exact decimal text, which reads back as
/// the same decimal for up to 15 significant digits.
fn serialize_price<S>(price: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let value = price
        .to_string()
        .parse::<f64>()
        .map_err(serde::ser::Error::custom)?;

    serializer.serialize_f64(value)
}

fn default_quantity() -> u32 {
    1
}

/// Missing, `null` and `0` quantities all count as a single unit.
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let quantity = Option::<u32>::deserialize(deserializer)?;

    Ok(quantity.filter(|quantity| *quantity > 0).unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_item_has_quantity_one() {
        let item = LineItem::new("Pão", Decimal::new(500, 2));

        assert_eq!(item.quantity(), 1);
        assert_eq!(item.description(), None);
    }

    #[test]
    fn with_quantity_never_goes_below_one() {
        let item = LineItem::new("Pão", Decimal::new(500, 2)).with_quantity(0);

        assert_eq!(item.quantity(), 1);
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() -> TestResult {
        let item = LineItem::new("Pão", Decimal::new(500, 2)).with_quantity(3);

        assert_eq!(item.line_total()?, Decimal::new(1500, 2));

        Ok(())
    }

    #[test]
    fn line_total_overflow_is_an_error() -> TestResult {
        let item = LineItem::from_json(r#"{"name":"Big","price":1e28}"#)?.with_quantity(8);

        assert_eq!(item.line_total(), Err(PricingError::Overflow));

        Ok(())
    }

    #[test]
    fn price_reads_back_unchanged() -> TestResult {
        for price in [
            Decimal::new(75, 2),
            Decimal::new(135, 2),
            Decimal::new(999_999_999_999_999, 2),
            "10000000000000000000000000000".parse::<Decimal>()?,
        ] {
            let item = LineItem::new("Pão", price);

            let restored: LineItem = serde_json::from_str(&serde_json::to_string(&item)?)?;

            assert_eq!(restored.price(), price);
        }

        Ok(())
    }

    #[test]
    fn missing_quantity_deserializes_as_one() -> TestResult {
        let item: LineItem = serde_json::from_str(r#"{"name":"Bolo","price":20.0}"#)?;

        assert_eq!(item.quantity(), 1);
        assert_eq!(item.price(), Decimal::new(20, 0));

        Ok(())
    }

    #[test]
    fn zero_and_null_quantities_deserialize_as_one() -> TestResult {
        let zero: LineItem = serde_json::from_str(r#"{"name":"Bolo","price":20,"quantity":0}"#)?;
        let null: LineItem =
            serde_json::from_str(r#"{"name":"Bolo","price":20,"quantity":null}"#)?;

        assert_eq!(zero.quantity(), 1);
        assert_eq!(null.quantity(), 1);

        Ok(())
    }

    #[test]
    fn serializes_price_as_number_and_skips_missing_description() -> TestResult {
        let item = LineItem::new("Pão", Decimal::new(550, 2)).with_quantity(2);

        let json = serde_json::to_string(&item)?;

        assert_eq!(json, r#"{"name":"Pão","price":5.5,"quantity":2}"#);

        Ok(())
    }

    #[test]
    fn from_json_reads_trigger_payload() -> TestResult {
        let item = LineItem::from_json(
            r#"{"name":"Sonho","price":7.5,"description":"Creme","image":"sonho.jpg"}"#,
        )?;

        assert_eq!(item.name(), "Sonho");
        assert_eq!(item.price(), Decimal::new(75, 1));
        assert_eq!(item.description(), Some("Creme"));

        Ok(())
    }

    #[test]
    fn from_json_rejects_malformed_payload() {
        let result = LineItem::from_json("{name: Sonho}");

        assert!(matches!(result, Err(ItemError::Json(_))));
    }

    #[test]
    fn from_json_rejects_missing_price() {
        let result = LineItem::from_json(r#"{"name":"Sonho"}"#);

        assert!(matches!(result, Err(ItemError::Json(_))));
    }

    #[test]
    fn from_json_rejects_blank_name() {
        let result = LineItem::from_json(r#"{"name":"  ","price":1}"#);

        assert!(matches!(result, Err(ItemError::BlankName)));
    }

    #[test]
    fn from_json_rejects_sub_centavo_price() {
        let result = LineItem::from_json(r#"{"name":"Sonho","price":1.234}"#);

        assert!(
            matches!(result, Err(ItemError::UnstorablePrice { ref name, .. }) if name == "Sonho"),
            "expected UnstorablePrice, got {result:?}"
        );
    }

    #[test]
    fn from_json_rejects_negative_price() {
        let result = LineItem::from_json(r#"{"name":"Sonho","price":-1.5}"#);

        assert!(
            matches!(result, Err(ItemError::NegativePrice { ref name, .. }) if name == "Sonho"),
            "expected NegativePrice, got {result:?}"
        );
    }
}
