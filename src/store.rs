//! Cart Store
//!
//! The only component that mutates persisted cart state. Every operation is a full
//! read-modify-write cycle against a single storage slot: load the whole cart, apply
//! one edit, write the whole cart back. There is no locking or versioning, so two
//! stores sharing one storage lose updates (the later write wins).

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::{
    cart::{AddOutcome, Cart, QuantityChange},
    items::LineItem,
    storage::Storage,
};

/// Slot key used when none is given.
pub const DEFAULT_CART_KEY: &str = "panificadoraCart";

/// Stored values that mean "nothing here" rather than a cart.
const EMPTY_SENTINELS: [&str; 2] = ["undefined", "null"];

/// Receives the new cart after every mutation, for re-rendering counters and lists.
pub trait CartObserver {
    /// Called with the cart as it stands after a mutation.
    fn on_cart_changed(&mut self, cart: &Cart);
}

impl<F> CartObserver for F
where
    F: FnMut(&Cart),
{
    fn on_cart_changed(&mut self, cart: &Cart) {
        self(cart);
    }
}

/// Persistent cart bound to one storage slot.
pub struct CartStore<S> {
    storage: S,
    key: String,
    observers: Vec<Box<dyn CartObserver>>,
}

impl<S: Storage> CartStore<S> {
    /// Create a store on the default slot key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_CART_KEY)
    }

    /// Create a store on the given slot key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            observers: Vec::new(),
        }
    }

    /// Slot key the cart is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Register an observer notified after every mutation.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Returns the persisted cart.
    ///
    /// An absent slot, a read failure, the literal text `undefined` or `null`, and
    /// unparseable content all yield an empty cart. Failures are logged, never returned.
    pub fn load(&self) -> Cart {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(read_error) => {
                warn!(key = %self.key, error = %read_error, "failed to read cart, using empty cart");

                return Cart::new();
            }
        };

        if raw.trim().is_empty() || EMPTY_SENTINELS.contains(&raw.as_str()) {
            return Cart::new();
        }

        match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(parse_error) => {
                warn!(key = %self.key, error = %parse_error, "stored cart is corrupt, using empty cart");

                Cart::new()
            }
        }
    }

    /// Persists the full cart, overwriting the previous value.
    ///
    /// Returns `false` if the write was rejected. Nothing is rolled back.
    pub fn save(&mut self, cart: &Cart) -> bool {
        let serialized = match serde_json::to_string(cart) {
            Ok(serialized) => serialized,
            Err(serialize_error) => {
                error!(key = %self.key, error = %serialize_error, "failed to serialize cart");

                return false;
            }
        };

        match self.storage.set(&self.key, &serialized) {
            Ok(()) => true,
            Err(write_error) => {
                error!(key = %self.key, error = %write_error, "failed to save cart");

                false
            }
        }
    }

    /// Adds an item, merging by exact name, then persists.
    ///
    /// An existing line has its quantity incremented. A new line is appended with a
    /// quantity of 1. Returns the updated cart even if the write failed.
    #[tracing::instrument(name = "cart_store.add", skip(self, item), fields(key = %self.key, item = %item.name()))]
    pub fn add(&mut self, item: LineItem) -> Cart {
        let mut cart = self.load();
        let name = item.name().to_string();

        match cart.add(item) {
            AddOutcome::Inserted => info!(item = %name, "added new item"),
            AddOutcome::Incremented(quantity) => {
                info!(item = %name, quantity, "incremented item quantity");
            }
        }

        self.commit(cart)
    }

    /// Applies `delta` to the quantity of the line at `index`, removing it if the result
    /// is below 1, then persists.
    ///
    /// An out-of-range `index` is a silent no-op: nothing is written or notified.
    #[tracing::instrument(name = "cart_store.set_quantity", skip(self), fields(key = %self.key))]
    pub fn set_quantity(&mut self, index: usize, delta: i64) -> Cart {
        let mut cart = self.load();

        let Some(change) = cart.adjust_quantity(index, delta) else {
            debug!(index, len = cart.len(), "quantity change ignored, index out of range");

            return cart;
        };

        log_quantity_change(&change);

        self.commit(cart)
    }

    /// Applies `delta` to the quantity of the line named `name`. Unknown names are a
    /// silent no-op.
    #[tracing::instrument(name = "cart_store.set_quantity_by_name", skip(self), fields(key = %self.key))]
    pub fn set_quantity_by_name(&mut self, name: &str, delta: i64) -> Cart {
        let mut cart = self.load();

        let Some(change) = cart.adjust_quantity_of(name, delta) else {
            debug!("quantity change ignored, item not in cart");

            return cart;
        };

        log_quantity_change(&change);

        self.commit(cart)
    }

    /// Removes the line at `index`, then persists. An out-of-range `index` is a silent
    /// no-op.
    #[tracing::instrument(name = "cart_store.remove", skip(self), fields(key = %self.key))]
    pub fn remove(&mut self, index: usize) -> Cart {
        let mut cart = self.load();

        let Some(removed) = cart.remove(index) else {
            debug!(index, len = cart.len(), "removal ignored, index out of range");

            return cart;
        };

        info!(item = %removed.name(), "removed item");

        self.commit(cart)
    }

    /// Removes the line named `name`, then persists. Unknown names are a silent no-op.
    #[tracing::instrument(name = "cart_store.remove_by_name", skip(self), fields(key = %self.key))]
    pub fn remove_by_name(&mut self, name: &str) -> Cart {
        let mut cart = self.load();

        if cart.remove_named(name).is_none() {
            debug!("removal ignored, item not in cart");

            return cart;
        }

        info!("removed item");

        self.commit(cart)
    }

    /// Deletes the slot entirely. Returns `false` if the deletion was rejected.
    #[tracing::instrument(name = "cart_store.clear", skip(self), fields(key = %self.key))]
    pub fn clear(&mut self) -> bool {
        let cleared = match self.storage.delete(&self.key) {
            Ok(()) => {
                info!("cleared cart");

                true
            }
            Err(delete_error) => {
                error!(error = %delete_error, "failed to clear cart");

                false
            }
        };

        self.notify(&Cart::new());

        cleared
    }

    fn commit(&mut self, cart: Cart) -> Cart {
        self.save(&cart);
        self.notify(&cart);

        cart
    }

    fn notify(&mut self, cart: &Cart) {
        debug!(
            lines = cart.len(),
            items = cart.total_item_count(),
            "cart changed"
        );

        for observer in &mut self.observers {
            observer.on_cart_changed(cart);
        }
    }
}

fn log_quantity_change(change: &QuantityChange) {
    match change {
        QuantityChange::Updated(quantity) => info!(quantity, "updated item quantity"),
        QuantityChange::Removed(item) => info!(item = %item.name(), "removed item"),
    }
}

impl<S: fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("observers", &self.observers.len())
            .finish()
    }
}
