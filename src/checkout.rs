//! Checkout
//!
//! Turns the persisted cart plus collected form values into an [`Order`], then clears
//! the cart.

use std::fmt;

use jiff::Timestamp;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cart::Cart,
    order::{Customer, Order, Payment},
    pricing::{DeliveryMode, DeliveryRates, OrderTotals, PricingError},
    storage::Storage,
    store::CartStore,
};

/// Form fields that must be filled in before checking out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    /// Customer name
    Name,

    /// Customer phone
    Phone,

    /// Delivery address
    Address,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredField::Name => f.write_str("name"),
            RequiredField::Phone => f.write_str("phone"),
            RequiredField::Address => f.write_str("address"),
        }
    }
}

/// Checkout Errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// A required field is blank.
    #[error("Missing required field: {0}")]
    MissingField(RequiredField),

    /// There is nothing to order.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// The order totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Values collected by the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Customer contact and address
    pub customer: Customer,

    /// Pickup or delivery
    pub delivery: DeliveryMode,

    /// Payment selection
    pub payment: Payment,
}

impl CheckoutForm {
    /// First required field that is blank after trimming, if any.
    pub fn missing_field(&self) -> Option<RequiredField> {
        [
            (RequiredField::Name, &self.customer.name),
            (RequiredField::Phone, &self.customer.phone),
            (RequiredField::Address, &self.customer.address),
        ]
        .into_iter()
        .find_map(|(field, value)| value.trim().is_empty().then_some(field))
    }

    /// Check the form and cart are ready for checkout.
    ///
    /// Only presence is checked; phone and e-mail formats are not.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::MissingField`]: a required field is blank.
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    pub fn validate(&self, cart: &Cart) -> Result<(), CheckoutError> {
        if let Some(field) = self.missing_field() {
            return Err(CheckoutError::MissingField(field));
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(())
    }

    /// Whether the checkout action should be enabled.
    pub fn is_ready(&self, cart: &Cart) -> bool {
        self.validate(cart).is_ok()
    }
}

/// Build an order from the persisted cart and `form`, then clear the cart.
///
/// The cart is left untouched when validation or totalling fails. A failure to clear the cart after
/// the order is built is logged and does not fail the checkout.
///
/// # Errors
///
/// Returns a [`CheckoutError`] if the form or cart is not ready, or the totals overflow.
#[tracing::instrument(name = "checkout", skip_all, fields(delivery = %form.delivery, payment = %form.payment.method()))]
pub fn checkout<S: Storage>(
    store: &mut CartStore<S>,
    form: CheckoutForm,
    rates: &DeliveryRates,
    placed_at: Timestamp,
) -> Result<Order, CheckoutError> {
    let cart = store.load();

    form.validate(&cart)?;

    let totals = OrderTotals::compute(&cart, form.delivery, rates)?;

    let order = Order::new(
        cart,
        form.customer,
        form.delivery,
        form.payment,
        totals,
        placed_at,
    );

    info!(
        lines = order.items().len(),
        subtotal = %totals.subtotal(),
        total = %totals.total(),
        "order placed"
    );

    if !store.clear() {
        warn!("order placed but cart could not be cleared");
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{items::LineItem, order::PaymentMethod, storage::MemoryStorage};

    fn form() -> CheckoutForm {
        CheckoutForm {
            customer: Customer {
                name: "Maria".to_string(),
                phone: "11 99999-0000".to_string(),
                address: "Rua das Flores, 10".to_string(),
                ..Customer::default()
            },
            delivery: DeliveryMode::Delivery,
            payment: Payment::new(PaymentMethod::Cash, Some(Decimal::new(50, 0))),
        }
    }

    fn stocked_store() -> CartStore<MemoryStorage> {
        let mut store = CartStore::new(MemoryStorage::new());

        store.add(LineItem::new("Pão", Decimal::new(500, 2)));
        store.add(LineItem::new("Pão", Decimal::new(500, 2)));
        store.add(LineItem::new("Bolo", Decimal::new(2000, 2)));

        store
    }

    #[test]
    fn missing_field_reports_first_blank_field() {
        let mut form = form();
        form.customer.phone = "   ".to_string();
        form.customer.address = String::new();

        assert_eq!(form.missing_field(), Some(RequiredField::Phone));
    }

    #[test]
    fn validate_rejects_empty_cart() {
        assert_eq!(form().validate(&Cart::new()), Err(CheckoutError::EmptyCart));
        assert!(!form().is_ready(&Cart::new()));
    }

    #[test]
    fn optional_fields_may_be_blank() {
        let cart = Cart::with_items([LineItem::new("Pão", Decimal::new(500, 2))]);

        assert!(form().is_ready(&cart));
    }

    #[test]
    fn checkout_builds_order_and_clears_cart() -> TestResult {
        let mut store = stocked_store();
        let placed_at: Timestamp = "2026-10-16T12:00:00Z".parse()?;

        let order = checkout(&mut store, form(), &DeliveryRates::default(), placed_at)?;

        assert_eq!(order.items().total_item_count(), 3);
        assert_eq!(order.totals().subtotal(), Decimal::new(30, 0));
        assert_eq!(order.totals().total(), Decimal::new(35, 0));
        assert_eq!(order.customer().name, "Maria");
        assert_eq!(order.placed_at(), placed_at);
        assert!(store.load().is_empty());

        Ok(())
    }

    #[test]
    fn pickup_checkout_has_no_fee() -> TestResult {
        let mut store = stocked_store();
        let form = CheckoutForm {
            delivery: DeliveryMode::Pickup,
            ..form()
        };

        let order = checkout(&mut store, form, &DeliveryRates::default(), Timestamp::UNIX_EPOCH)?;

        assert_eq!(order.totals().delivery_fee(), Decimal::ZERO);
        assert_eq!(order.totals().total(), Decimal::new(30, 0));

        Ok(())
    }

    #[test]
    fn failed_checkout_keeps_cart() {
        let mut store = stocked_store();
        let mut form = form();
        form.customer.name = String::new();

        let result = checkout(&mut store, form, &DeliveryRates::default(), Timestamp::UNIX_EPOCH);

        assert_eq!(
            result,
            Err(CheckoutError::MissingField(RequiredField::Name))
        );
        assert_eq!(store.load().total_item_count(), 3);
    }

    #[test]
    fn overflowing_totals_fail_and_keep_cart() -> TestResult {
        let mut store = CartStore::new(MemoryStorage::new());
        let big = LineItem::from_json(r#"{"name":"Big","price":1e28}"#)?;

        for _ in 0..8 {
            store.add(big.clone());
        }

        let result = checkout(&mut store, form(), &DeliveryRates::default(), Timestamp::UNIX_EPOCH);

        assert_eq!(result, Err(CheckoutError::Pricing(PricingError::Overflow)));
        assert_eq!(store.load().total_item_count(), 8);

        Ok(())
    }
}
