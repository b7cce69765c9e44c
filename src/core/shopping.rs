//! Shopping list business logic.
//!
//! The list is persisted as one text set under [`SHOPPING_ITEMS_KEY`], each
//! element encoded as `name||quantity`. Because the stored form is a set,
//! identical pairs collapse and insertion order does not survive a reload.

use super::LoadSummary;
use crate::{
    errors::Result,
    store::{KeyValueStore, WriteBatch},
};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// Storage key holding the encoded shopping entries.
pub const SHOPPING_ITEMS_KEY: &str = "shoppingItems";

const ENTRY_SEPARATOR: &str = "||";

/// One shopping list entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShoppingItem {
    /// What to buy
    pub name: String,
    /// Free-form quantity or calorie label, kept as text
    pub quantity_label: String,
}

impl ShoppingItem {
    /// Creates an item.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity_label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity_label: quantity_label.into(),
        }
    }

    /// Encodes the item as `name||quantity_label`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}{ENTRY_SEPARATOR}{}", self.name, self.quantity_label)
    }

    /// Decodes `name||quantity_label`, splitting on the first separator.
    /// Returns `None` when the separator is missing.
    #[must_use]
    pub fn decode(entry: &str) -> Option<Self> {
        entry
            .split_once(ENTRY_SEPARATOR)
            .map(|(name, quantity_label)| Self::new(name, quantity_label))
    }
}

/// In-memory list plus durable persistence of shopping entries.
///
/// The in-memory list mirrors the persisted set: adding a pair that is
/// already present changes nothing. Mutating before [`load_items`](Self::load_items)
/// loads the list first.
#[derive(Debug)]
pub struct ShoppingListStore<S> {
    store: S,
    items: Vec<ShoppingItem>,
    loaded: bool,
}

impl<S: KeyValueStore> ShoppingListStore<S> {
    /// Creates an empty, not yet loaded list over `store`.
    pub const fn new(store: S) -> Self {
        Self {
            store,
            items: Vec::new(),
            loaded: false,
        }
    }

    /// Current in-memory items.
    #[must_use]
    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    /// Whether [`load_items`](Self::load_items) has completed at least once.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replaces the in-memory list with the persisted entries.
    ///
    /// Entries without the `||` separator are skipped and logged.
    #[instrument(skip(self))]
    pub async fn load_items(&mut self) -> Result<LoadSummary> {
        let entries = self.persisted_entries().await?;
        self.items.clear();
        let mut summary = LoadSummary::default();

        for entry in entries {
            if let Some(item) = ShoppingItem::decode(&entry) {
                self.items.push(item);
                summary.applied += 1;
            } else {
                warn!(entry = %entry, "Skipping shopping entry without separator");
                summary.skipped += 1;
            }
        }

        self.loaded = true;
        info!(
            items = summary.applied,
            skipped = summary.skipped,
            "Loaded shopping list"
        );
        Ok(summary)
    }

    /// Adds `name`/`quantity_label` to the persisted set and the in-memory list.
    #[instrument(skip(self))]
    pub async fn add_item(&mut self, name: &str, quantity_label: &str) -> Result<()> {
        self.ensure_loaded().await?;
        let item = ShoppingItem::new(name, quantity_label);
        let mut entries = self.persisted_entries().await?;
        if entries.insert(item.encode()) {
            self.save(entries).await?;
        } else {
            debug!("Shopping entry already persisted");
        }

        if !self.items.contains(&item) {
            self.items.push(item);
        }
        Ok(())
    }

    /// Removes the exact pair from the persisted set and the first match from the
    /// in-memory list. Removing an absent pair is a no-op.
    #[instrument(skip(self))]
    pub async fn remove_item(&mut self, name: &str, quantity_label: &str) -> Result<()> {
        self.ensure_loaded().await?;
        let item = ShoppingItem::new(name, quantity_label);
        let mut entries = self.persisted_entries().await?;
        if entries.remove(&item.encode()) {
            self.save(entries).await?;
        } else {
            debug!("Shopping entry not persisted, nothing to remove");
        }

        if let Some(pos) = self.items.iter().position(|i| *i == item) {
            self.items.remove(pos);
        }
        Ok(())
    }

    async fn ensure_loaded(&mut self) -> Result<()> {
        if !self.loaded {
            self.load_items().await?;
        }
        Ok(())
    }

    async fn persisted_entries(&self) -> Result<BTreeSet<String>> {
        match self.store.get(SHOPPING_ITEMS_KEY).await? {
            None => Ok(BTreeSet::new()),
            Some(value) => {
                let kind = value.kind();
                Ok(value.into_text_set().unwrap_or_else(|| {
                    warn!(kind, "Shopping list stored with unexpected type, treating as empty");
                    BTreeSet::new()
                }))
            }
        }
    }

    async fn save(&self, entries: BTreeSet<String>) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.put_text_set(SHOPPING_ITEMS_KEY, entries);
        self.store.apply(batch).await
    }
}
