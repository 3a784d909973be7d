use std::io;

use breadbasket::{
    catalog::{Catalog, CatalogError},
    checkout::CheckoutError,
    config::{CartConfig, LoggingConfig},
    items::ItemError,
    pricing::PricingError,
    views::ViewError,
};
use clap::{Parser, Subcommand};
use thiserror::Error;

mod cart;
mod checkout;
mod menu;

#[derive(Debug, Parser)]
#[command(name = "breadbasket", about = "Bakery shopping cart", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) cart: CartConfig,

    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the products on the menu
    Menu,

    /// Add one unit of an item to the cart
    Add(cart::AddArgs),

    /// Show the cart with totals
    Show,

    /// Print the number of items in the cart
    Count,

    /// Increase the quantity of a line by one
    Inc(cart::LineTarget),

    /// Decrease the quantity of a line by one, removing it at zero
    Dec(cart::LineTarget),

    /// Remove a line from the cart
    Remove(cart::LineTarget),

    /// Empty the cart
    Clear,

    /// Place the order and empty the cart
    Checkout(checkout::CheckoutArgs),
}

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("Failed to add item: {0}. Please try again.")]
    Item(#[from] ItemError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("No menu configured; pass --menu or set MENU_PATH")]
    MenuRequired,

    #[error("Cannot place order: {0}")]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("Failed to encode order: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Cli {
    pub(crate) fn run(self) -> Result<(), CliError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let config = self.cart;

        match self.command {
            Commands::Menu => menu::run(&mut out, &load_menu(&config)?),
            Commands::Add(args) => cart::add(&mut out, &config, args),
            Commands::Show => cart::show(&mut out, &config),
            Commands::Count => cart::count(&mut out, &config),
            Commands::Inc(target) => cart::adjust(&mut out, &config, &target, 1),
            Commands::Dec(target) => cart::adjust(&mut out, &config, &target, -1),
            Commands::Remove(target) => cart::remove(&mut out, &config, &target),
            Commands::Clear => cart::clear(&mut out, &config),
            Commands::Checkout(args) => checkout::run(&mut out, &config, args),
        }
    }
}

fn load_menu(config: &CartConfig) -> Result<Catalog, CliError> {
    let path = config.menu.as_ref().ok_or(CliError::MenuRequired)?;

    Ok(Catalog::from_path(path)?)
}
