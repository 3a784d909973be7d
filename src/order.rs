//! Orders

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    cart::Cart,
    pricing::{DeliveryMode, OrderTotals},
};

/// Customer contact and delivery address details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Customer {
    /// Full name (required)
    pub name: String,

    /// Phone number (required, not format-checked)
    pub phone: String,

    /// E-mail address
    pub email: String,

    /// Delivery address (required)
    pub address: String,

    /// Address complement, e.g. apartment number
    pub complement: String,

    /// Reference point near the address
    pub reference: String,

    /// Free-form delivery instructions
    pub instructions: String,
}

/// How the customer pays on delivery or pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash, optionally with change for a larger note.
    #[default]
    Cash,

    /// Debit or credit card.
    Card,

    /// Pix instant transfer.
    Pix,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("cash"),
            PaymentMethod::Card => f.write_str("card"),
            PaymentMethod::Pix => f.write_str("pix"),
        }
    }
}

/// Payment selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Payment {
    method: PaymentMethod,

    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    change_for: Option<Decimal>,
}

impl Payment {
    /// Create a payment selection. `change_for` is only kept for cash payments.
    pub fn new(method: PaymentMethod, change_for: Option<Decimal>) -> Self {
        Self {
            method,
            change_for: change_for.filter(|_| method == PaymentMethod::Cash),
        }
    }

    /// Selected payment method
    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Note the customer will pay with, when paying cash and change is needed
    pub fn change_for(&self) -> Option<Decimal> {
        self.change_for
    }
}

/// One-time snapshot of a cart and checkout details. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    items: Cart,
    customer: Customer,
    delivery: DeliveryMode,
    payment: Payment,
    totals: OrderTotals,
    placed_at: Timestamp,
}

impl Order {
    pub(crate) fn new(
        items: Cart,
        customer: Customer,
        delivery: DeliveryMode,
        payment: Payment,
        totals: OrderTotals,
        placed_at: Timestamp,
    ) -> Self {
        Self {
            items,
            customer,
            delivery,
            payment,
            totals,
            placed_at,
        }
    }

    /// Cart contents at checkout time
    pub fn items(&self) -> &Cart {
        &self.items
    }

    /// Customer details
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    /// Delivery mode
    pub fn delivery(&self) -> DeliveryMode {
        self.delivery
    }

    /// Payment selection
    pub fn payment(&self) -> Payment {
        self.payment
    }

    /// Subtotal, delivery fee and total
    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    /// When the order was placed
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }
}
