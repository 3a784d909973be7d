//! Views
//!
//! Plain-text renderings of the cart and the order confirmation.

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::Columns,
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    order::Order,
    pricing::{PricingError, to_money},
};

/// Errors that can occur while rendering a view.
#[derive(Debug, Error)]
pub enum ViewError {
    /// An amount overflowed or could not be converted to money.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Writing to the output failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Writes the cart as a table with quantities, line totals and the subtotal.
///
/// Row numbers are the positions accepted by the index-based store operations.
///
/// # Errors
///
/// Returns a [`ViewError`] if an amount overflows or is not representable, or the output
/// fails.
pub fn write_cart(mut out: impl io::Write, cart: &Cart) -> Result<(), ViewError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty. Add items from the menu to place an order.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["#", "Item", "Description", "Price", "Qty", "Total"]);

    for (index, item) in cart.iter().enumerate() {
        builder.push_record([
            index.to_string(),
            item.name().to_string(),
            item.description().unwrap_or_default().to_string(),
            to_money(item.price())?.to_string(),
            item.quantity().to_string(),
            to_money(item.line_total()?)?.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(out, "Items: {}", cart.total_item_count())?;
    writeln!(out, "Subtotal: {}", to_money(cart.subtotal()?)?)?;

    Ok(())
}

/// Writes the order confirmation: one row per line, then subtotal, delivery fee and total.
///
/// # Errors
///
/// Returns a [`ViewError`] if an amount is not representable or the output fails.
pub fn write_order(mut out: impl io::Write, order: &Order) -> Result<(), ViewError> {
    let totals = order.totals();
    let mut builder = Builder::default();

    builder.push_record(["Item", "Amount"]);

    for item in order.items() {
        builder.push_record([
            format!("{} x{}", item.name(), item.quantity()),
            to_money(item.line_total()?)?.to_string(),
        ]);
    }

    builder.push_record(["Subtotal".to_string(), to_money(totals.subtotal())?.to_string()]);
    builder.push_record([
        "Delivery fee".to_string(),
        to_money(totals.delivery_fee())?.to_string(),
    ]);
    builder.push_record(["Total".to_string(), to_money(totals.total())?.to_string()]);

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::last(), Alignment::right());

    writeln!(out, "Order confirmed for {}", order.customer().name)?;
    writeln!(out, "Placed at: {}", order.placed_at())?;
    writeln!(
        out,
        "Delivery: {}, payment: {}",
        order.delivery(),
        order.payment().method()
    )?;

    if let Some(change_for) = order.payment().change_for() {
        writeln!(out, "Change for: {}", to_money(change_for)?)?;
    }

    writeln!(out, "{table}")?;

    Ok(())
}
