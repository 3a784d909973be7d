//! Pricing

use std::fmt;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::Cart;

/// Flat fee charged for home delivery when none is configured: R$ 5.00.
pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Currency every amount is expressed in: Brazilian real.
pub fn currency() -> &'static Currency {
    iso::BRL
}

/// Most decimal places a stored price may carry: whole centavos.
pub const PRICE_SCALE: u32 = 2;

/// Most significant digits a stored price may carry. Prices are persisted as JSON
/// numbers, which keep 15 significant digits exactly.
pub const PRICE_SIGNIFICANT_DIGITS: u32 = 15;

/// Errors that can occur while totalling or converting amounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The amount cannot be represented in minor units.
    #[error("amount cannot be represented in minor units: {0}")]
    NotRepresentable(Decimal),

    /// A line total or sum exceeded the decimal range.
    #[error("amount overflowed while totalling")]
    Overflow,
}

/// Whether `price` is whole centavos and short enough to survive a save/load unchanged.
pub fn is_storable_price(price: Decimal) -> bool {
    let price = price.normalize();
    let mut mantissa = price.mantissa().unsigned_abs();

    while mantissa != 0 && mantissa % 10 == 0 {
        mantissa /= 10;
    }

    let digits = mantissa.checked_ilog10().map_or(1, |log| log + 1);

    price.scale() <= PRICE_SCALE && digits <= PRICE_SIGNIFICANT_DIGITS
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Customer collects the order at the shop; no fee.
    Pickup,

    /// Order is delivered to the customer's address for a flat fee.
    #[default]
    Delivery,
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Pickup => f.write_str("pickup"),
            DeliveryMode::Delivery => f.write_str("delivery"),
        }
    }
}

/// Delivery fee schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryRates {
    delivery_fee: Decimal,
}

impl DeliveryRates {
    /// Create a schedule charging `delivery_fee` for home delivery.
    pub fn new(delivery_fee: Decimal) -> Self {
        Self { delivery_fee }
    }

    /// Fee charged for the given delivery mode.
    pub fn fee_for(&self, mode: DeliveryMode) -> Decimal {
        match mode {
            DeliveryMode::Pickup => Decimal::ZERO,
            DeliveryMode::Delivery => self.delivery_fee,
        }
    }
}

impl Default for DeliveryRates {
    fn default() -> Self {
        Self::new(DEFAULT_DELIVERY_FEE)
    }
}

/// Subtotal, delivery fee and total for one cart and delivery mode.
///
/// The three values are only ever computed together from their inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    #[serde(with = "rust_decimal::serde::float")]
    subtotal: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    delivery_fee: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
}

impl OrderTotals {
    /// Compute the totals for `cart` delivered via `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if a line total or a sum exceeds the decimal range.
    pub fn compute(
        cart: &Cart,
        mode: DeliveryMode,
        rates: &DeliveryRates,
    ) -> Result<Self, PricingError> {
        let subtotal = cart.subtotal()?;
        let delivery_fee = rates.fee_for(mode);
        let total = subtotal
            .checked_add(delivery_fee)
            .ok_or(PricingError::Overflow)?;

        Ok(Self {
            subtotal,
            delivery_fee,
            total,
        })
    }

    /// Sum of price × quantity over the cart
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Fee for the selected delivery mode
    pub fn delivery_fee(&self) -> Decimal {
        self.delivery_fee
    }

    /// Subtotal plus delivery fee
    pub fn total(&self) -> Decimal {
        self.total
    }
}

/// Convert an amount to [`Money`] in [`currency`], rounding to the nearest minor unit.
///
/// # Errors
///
/// Returns [`PricingError::NotRepresentable`] if the amount overflows minor units.
pub fn to_money(amount: Decimal) -> Result<Money<'static, Currency>, PricingError> {
    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or(PricingError::NotRepresentable(amount))?;

    Ok(Money::from_minor(minor_units, currency()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::items::LineItem;

    fn bakery_cart() -> Cart {
        Cart::with_items([
            LineItem::new("Pão", Decimal::new(500, 2)).with_quantity(2),
            LineItem::new("Bolo", Decimal::new(2000, 2)),
        ])
    }

    #[test]
    fn default_delivery_fee_is_five() {
        assert_eq!(DEFAULT_DELIVERY_FEE, Decimal::new(5, 0));
        assert_eq!(
            DeliveryRates::default().fee_for(DeliveryMode::Delivery),
            Decimal::new(5, 0)
        );
    }

    #[test]
    fn pickup_has_no_fee() -> TestResult {
        let totals = OrderTotals::compute(
            &bakery_cart(),
            DeliveryMode::Pickup,
            &DeliveryRates::default(),
        )?;

        assert_eq!(totals.subtotal(), Decimal::new(30, 0));
        assert_eq!(totals.delivery_fee(), Decimal::ZERO);
        assert_eq!(totals.total(), Decimal::new(30, 0));

        Ok(())
    }

    #[test]
    fn delivery_adds_flat_fee() -> TestResult {
        let totals = OrderTotals::compute(
            &bakery_cart(),
            DeliveryMode::Delivery,
            &DeliveryRates::default(),
        )?;

        assert_eq!(totals.subtotal(), Decimal::new(30, 0));
        assert_eq!(totals.delivery_fee(), Decimal::new(5, 0));
        assert_eq!(totals.total(), Decimal::new(35, 0));

        Ok(())
    }

    #[test]
    fn totals_follow_cart_and_mode_changes() -> TestResult {
        let rates = DeliveryRates::new(Decimal::new(750, 2));
        let mut cart = bakery_cart();

        let before = OrderTotals::compute(&cart, DeliveryMode::Delivery, &rates)?;
        cart.adjust_quantity(1, -1);
        let after = OrderTotals::compute(&cart, DeliveryMode::Pickup, &rates)?;

        assert_eq!(before.total(), Decimal::new(3750, 2));
        assert_eq!(after.total(), Decimal::new(10, 0));

        Ok(())
    }

    #[test]
    fn empty_cart_delivery_costs_only_the_fee() -> TestResult {
        let totals = OrderTotals::compute(
            &Cart::new(),
            DeliveryMode::Delivery,
            &DeliveryRates::default(),
        )?;

        assert_eq!(totals.subtotal(), Decimal::ZERO);
        assert_eq!(totals.total(), DEFAULT_DELIVERY_FEE);

        Ok(())
    }

    #[test]
    fn delivery_fee_past_the_decimal_range_is_an_error() {
        let cart = Cart::with_items([LineItem::new("Big", Decimal::MAX)]);

        let result =
            OrderTotals::compute(&cart, DeliveryMode::Delivery, &DeliveryRates::default());

        assert_eq!(result, Err(PricingError::Overflow));
    }

    #[test]
    fn storable_prices_are_whole_centavos() {
        assert!(is_storable_price(Decimal::new(75, 2)));
        assert!(is_storable_price(Decimal::new(7500, 3)));
        assert!(is_storable_price(Decimal::ZERO));
        assert!(is_storable_price(Decimal::from(100_000_000_000_000_u64)));
        assert!(!is_storable_price(Decimal::new(1234, 3)));
    }

    #[test]
    fn storable_prices_fit_in_a_json_number() -> TestResult {
        assert!(is_storable_price(Decimal::new(999_999_999_999_999, 2)));
        assert!(is_storable_price("10000000000000000000000000000".parse::<Decimal>()?));
        assert!(!is_storable_price(Decimal::new(1_234_567_890_123_456, 2)));

        Ok(())
    }

    #[test]
    fn to_money_uses_minor_units() -> TestResult {
        assert_eq!(to_money(Decimal::new(3550, 2))?, Money::from_minor(35_50, iso::BRL));
        assert_eq!(to_money(Decimal::new(12345, 4))?, Money::from_minor(1_23, iso::BRL));

        Ok(())
    }

    #[test]
    fn to_money_rejects_overflow() {
        let result = to_money(Decimal::MAX);

        assert_eq!(result, Err(PricingError::NotRepresentable(Decimal::MAX)));
    }
}
