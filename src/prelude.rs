//! Breadbasket prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{AddOutcome, Cart, QuantityChange},
    catalog::{Catalog, CatalogError, Product},
    checkout::{CheckoutError, CheckoutForm, RequiredField, checkout},
    items::{ItemError, LineItem},
    order::{Customer, Order, Payment, PaymentMethod},
    pricing::{DeliveryMode, DeliveryRates, OrderTotals, PricingError, to_money},
    storage::{FileStorage, MemoryStorage, Storage, StorageError},
    store::{CartObserver, CartStore, DEFAULT_CART_KEY},
    views::{ViewError, write_cart, write_order},
};
