use std::io::Write;

use breadbasket::{
    cart::Cart, config::CartConfig, items::LineItem, pricing::to_money, views::write_cart,
};
use clap::Args;

use crate::cli::{CliError, load_menu};

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub(crate) struct AddArgs {
    /// Menu product key, e.g. `pao-frances`
    product: Option<String>,

    /// Raw item payload, e.g. `{"name":"Sonho","price":6.5}`
    #[arg(long)]
    item: Option<String>,
}

/// Which cart line a command acts on.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub(crate) struct LineTarget {
    /// Line position as shown by `show`
    #[arg(long)]
    index: Option<usize>,

    /// Exact item name
    #[arg(long)]
    name: Option<String>,
}

pub(crate) fn add(out: &mut impl Write, config: &CartConfig, args: AddArgs) -> Result<(), CliError> {
    let item = match args.item {
        Some(payload) => LineItem::from_json(&payload)?,
        None => load_menu(config)?.line_item(args.product.as_deref().unwrap_or_default())?,
    };

    let name = item.name().to_string();
    let cart = config.open_store().add(item);

    writeln!(out, "\"{name}\" added to the cart")?;
    write_count(out, &cart)?;

    Ok(())
}

pub(crate) fn show(out: &mut impl Write, config: &CartConfig) -> Result<(), CliError> {
    let cart = config.open_store().load();

    write_cart(&mut *out, &cart)?;

    Ok(())
}

pub(crate) fn count(out: &mut impl Write, config: &CartConfig) -> Result<(), CliError> {
    let cart = config.open_store().load();

    writeln!(out, "{}", cart.total_item_count())?;

    Ok(())
}

pub(crate) fn adjust(
    out: &mut impl Write,
    config: &CartConfig,
    target: &LineTarget,
    delta: i64,
) -> Result<(), CliError> {
    let mut store = config.open_store();

    let cart = match (&target.name, target.index) {
        (Some(name), _) => store.set_quantity_by_name(name, delta),
        (None, Some(index)) => store.set_quantity(index, delta),
        (None, None) => store.load(),
    };

    write_cart(&mut *out, &cart)?;

    Ok(())
}

pub(crate) fn remove(
    out: &mut impl Write,
    config: &CartConfig,
    target: &LineTarget,
) -> Result<(), CliError> {
    let mut store = config.open_store();

    let cart = match (&target.name, target.index) {
        (Some(name), _) => store.remove_by_name(name),
        (None, Some(index)) => store.remove(index),
        (None, None) => store.load(),
    };

    write_cart(&mut *out, &cart)?;

    Ok(())
}

pub(crate) fn clear(out: &mut impl Write, config: &CartConfig) -> Result<(), CliError> {
    if config.open_store().clear() {
        writeln!(out, "cart cleared")?;
    } else {
        writeln!(out, "cart could not be cleared")?;
    }

    Ok(())
}

fn write_count(out: &mut impl Write, cart: &Cart) -> Result<(), CliError> {
    writeln!(
        out,
        "cart: {} items, subtotal {}",
        cart.total_item_count(),
        to_money(cart.subtotal()?)?
    )?;

    Ok(())
}
