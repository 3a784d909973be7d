use std::io::Write;

use breadbasket::{catalog::Catalog, pricing::to_money};

use crate::cli::CliError;

pub(crate) fn run(out: &mut impl Write, catalog: &Catalog) -> Result<(), CliError> {
    if catalog.is_empty() {
        writeln!(out, "the menu has no products")?;

        return Ok(());
    }

    for product in catalog.products() {
        let price = to_money(product.price)?;

        writeln!(out, "{:<16} {:<24} {price}", product.key, product.name)?;

        if let Some(description) = &product.description {
            writeln!(out, "{:<16} {description}", "")?;
        }
    }

    Ok(())
}
