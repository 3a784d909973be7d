use std::io::Write;

use breadbasket::{
    checkout::{CheckoutForm, checkout},
    config::CartConfig,
    order::{Customer, Payment, PaymentMethod},
    pricing::DeliveryMode,
    views::write_order,
};
use clap::Args;
use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::cli::CliError;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Customer name
    #[arg(long, default_value_t)]
    name: String,

    /// Customer phone
    #[arg(long, default_value_t)]
    phone: String,

    /// Customer e-mail
    #[arg(long, default_value_t)]
    email: String,

    /// Delivery address
    #[arg(long, default_value_t)]
    address: String,

    /// Address complement
    #[arg(long, default_value_t)]
    complement: String,

    /// Reference point near the address
    #[arg(long, default_value_t)]
    reference: String,

    /// Delivery instructions
    #[arg(long, default_value_t)]
    instructions: String,

    /// Pickup at the shop or home delivery
    #[arg(long, value_enum, default_value_t = DeliveryMode::Delivery)]
    delivery: DeliveryMode,

    /// Payment method
    #[arg(long, value_enum, default_value_t = PaymentMethod::Cash)]
    payment: PaymentMethod,

    /// Note to bring change for, when paying cash
    #[arg(long)]
    change_for: Option<Decimal>,

    /// Print the order as JSON instead of a confirmation table
    #[arg(long)]
    json: bool,
}

pub(crate) fn run(
    out: &mut impl Write,
    config: &CartConfig,
    args: CheckoutArgs,
) -> Result<(), CliError> {
    let form = CheckoutForm {
        customer: Customer {
            name: args.name,
            phone: args.phone,
            email: args.email,
            address: args.address,
            complement: args.complement,
            reference: args.reference,
            instructions: args.instructions,
        },
        delivery: args.delivery,
        payment: Payment::new(args.payment, args.change_for),
    };

    let mut store = config.open_store();
    let order = checkout(&mut store, form, &config.delivery_rates(), Timestamp::now())?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &order)?;
        writeln!(out)?;
    } else {
        write_order(&mut *out, &order)?;
    }

    Ok(())
}
