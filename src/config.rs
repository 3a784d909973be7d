//! Configuration
//!
//! Settings shared by every CLI command, read from flags or the environment (a `.env`
//! file is loaded first when present).

use std::path::PathBuf;

use clap::Args;
use rust_decimal::Decimal;

use crate::{pricing::DeliveryRates, storage::FileStorage, store::CartStore};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Cart storage and pricing settings.
#[derive(Debug, Clone, Args)]
pub struct CartConfig {
    /// Directory holding the cart storage slots
    #[arg(long, env = "CART_STORAGE_DIR", default_value = ".breadbasket", global = true)]
    pub storage_dir: PathBuf,

    /// Storage slot key the cart is kept under
    #[arg(long, env = "CART_KEY", default_value = crate::store::DEFAULT_CART_KEY, global = true)]
    pub cart_key: String,

    /// Flat fee charged for home delivery
    #[arg(long, env = "DELIVERY_FEE", default_value = "5.00", global = true)]
    pub delivery_fee: Decimal,

    /// YAML menu catalog used to add products by key
    #[arg(long, env = "MENU_PATH", global = true)]
    pub menu: Option<PathBuf>,
}

impl CartConfig {
    /// Open the cart store described by this configuration.
    pub fn open_store(&self) -> CartStore<FileStorage> {
        CartStore::with_key(FileStorage::new(&self.storage_dir), self.cart_key.clone())
    }

    /// Delivery fee schedule described by this configuration.
    pub fn delivery_rates(&self) -> DeliveryRates {
        DeliveryRates::new(self.delivery_fee)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        cart: CartConfig,

        #[command(flatten)]
        logging: LoggingConfig,
    }

    #[test]
    fn flags_override_defaults() -> TestResult {
        let cli = TestCli::try_parse_from([
            "breadbasket",
            "--storage-dir",
            "/tmp/carts",
            "--cart-key",
            "tab",
            "--delivery-fee",
            "7.50",
            "--log-format",
            "json",
        ])?;

        assert_eq!(cli.cart.storage_dir, PathBuf::from("/tmp/carts"));
        assert_eq!(cli.cart.cart_key, "tab");
        assert_eq!(cli.cart.delivery_fee, Decimal::new(750, 2));
        assert_eq!(cli.logging.log_format, LogFormat::Json);
        assert_eq!(cli.cart.open_store().key(), "tab");
        assert_eq!(
            cli.cart.delivery_rates(),
            DeliveryRates::new(Decimal::new(750, 2))
        );

        Ok(())
    }

    #[test]
    fn invalid_delivery_fee_is_rejected() {
        let result = TestCli::try_parse_from(["breadbasket", "--delivery-fee", "five"]);

        assert!(result.is_err());
    }
}
