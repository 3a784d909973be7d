//! Breadbasket
//!
//! Breadbasket is a persistent shopping cart for a single-vendor bakery menu: a cart
//! store over pluggable key/value storage, order totals, and checkout into an order
//! snapshot.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod items;
pub mod observability;
pub mod order;
pub mod prelude;
pub mod pricing;
pub mod storage;
pub mod store;
pub mod views;
