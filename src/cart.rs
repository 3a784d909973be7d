//! Cart

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{items::LineItem, pricing::PricingError};

/// What [`Cart::add`] did with the incoming item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// No item with that name existed; it was appended with a quantity of 1.
    Inserted,

    /// An item with that name already existed; its quantity is now the given value.
    Incremented(u32),
}

/// Result of applying a quantity delta to a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line stays in the cart with the new quantity.
    Updated(u32),

    /// The quantity dropped below 1 and the line was removed.
    Removed(LineItem),
}

/// Ordered collection of line items with unique names.
///
/// Insertion order is preserved. Every line has a quantity of at least 1 and no two
/// lines share a name. Duplicate names found while building a cart from raw items are
/// folded into the first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create a new, empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from the given items, folding duplicate names together.
    pub fn with_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();

        for item in items {
            match cart.position(item.name()) {
                Some(index) => {
                    if let Some(existing) = cart.items.get_mut(index) {
                        let quantity = existing.quantity().saturating_add(item.quantity());
                        existing.set_quantity(quantity);
                    }
                }
                None => cart.items.push(item),
            }
        }

        cart
    }

    /// Adds an item, merging by exact name.
    ///
    /// An existing line only has its quantity incremented; the incoming price and
    /// description are ignored. A new line is appended with a quantity of exactly 1,
    /// whatever quantity the incoming item carried.
    pub fn add(&mut self, mut item: LineItem) -> AddOutcome {
        if let Some(existing) = self.find_mut(item.name()) {
            let quantity = existing.quantity().saturating_add(1);
            existing.set_quantity(quantity);

            return AddOutcome::Incremented(quantity);
        }

        item.set_quantity(1);
        self.items.push(item);

        AddOutcome::Inserted
    }

    /// Applies `delta` to the quantity of the line at `index`.
    ///
    /// Returns `None` when `index` is out of bounds. A resulting quantity below 1 removes
    /// the line.
    pub fn adjust_quantity(&mut self, index: usize, delta: i64) -> Option<QuantityChange> {
        let current = self.items.get(index)?.quantity();
        let quantity = i64::from(current).saturating_add(delta);

        if quantity < 1 {
            return self.remove(index).map(QuantityChange::Removed);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.items.get_mut(index)?.set_quantity(quantity);

        Some(QuantityChange::Updated(quantity))
    }

    /// Applies `delta` to the quantity of the line named `name`.
    ///
    /// Same rules as [`Cart::adjust_quantity`], but immune to reordering between render
    /// and action.
    pub fn adjust_quantity_of(&mut self, name: &str, delta: i64) -> Option<QuantityChange> {
        let index = self.position(name)?;

        self.adjust_quantity(index, delta)
    }

    /// Removes and returns the line at `index`, if it exists.
    pub fn remove(&mut self, index: usize) -> Option<LineItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Removes and returns the line named `name`, if it exists.
    pub fn remove_named(&mut self, name: &str) -> Option<LineItem> {
        let index = self.position(name)?;

        self.remove(index)
    }

    /// Position of the line named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name() == name)
    }

    /// Line named `name`.
    pub fn find(&self, name: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.name() == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.name() == name)
    }

    /// Line at `index`.
    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    pub fn total_item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity()))
            .sum()
    }

    /// Sum of price × quantity over all lines.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if a line total or the sum exceeds the decimal
    /// range.
    pub fn subtotal(&self) -> Result<Decimal, PricingError> {
        self.items.iter().try_fold(Decimal::ZERO, |acc, item| {
            acc.checked_add(item.line_total()?)
                .ok_or(PricingError::Overflow)
        })
    }
}

impl From<Vec<LineItem>> for Cart {
    fn from(items: Vec<LineItem>) -> Self {
        Self::with_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
