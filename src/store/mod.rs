//! Flat key-value persistence layer.
//!
//! Every piece of ledger state (day record fields, the shopping list, the
//! theme preference) lives under a plain string key in one store. Values are
//! typed ([`StoredValue`]) so a reader asking for a number never has to cast;
//! a mismatch simply reads as "no value" and the caller falls back to its
//! default.
//!
//! Writes are grouped into a [`WriteBatch`] and applied atomically.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A typed value held under a single key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StoredValue {
    /// Free-form text (notes, theme names)
    Text(String),
    /// Single-precision number (earnings, spendings)
    Number(f32),
    /// Deduplicating, unordered collection of text entries
    TextSet(BTreeSet<String>),
}

impl StoredValue {
    /// Returns the number if this value is numeric.
    #[must_use]
    pub const fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text if this value is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Consumes the value, returning the text if this value is text.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Consumes the value, returning the set if this value is a text set.
    #[must_use]
    pub fn into_text_set(self) -> Option<BTreeSet<String>> {
        match self {
            Self::TextSet(set) => Some(set),
            _ => None,
        }
    }

    /// Short name of the variant, used in log output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::TextSet(_) => "text_set",
        }
    }
}

/// A single pending mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert or overwrite `key`
    Put {
        /// Target key
        key: String,
        /// New value
        value: StoredValue,
    },
    /// Delete `key` if present
    Remove {
        /// Target key
        key: String,
    },
}

/// An ordered group of writes applied all-or-nothing by [`KeyValueStore::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Queues an overwrite of `key` with `value`.
    pub fn put(&mut self, key: impl Into<String>, value: StoredValue) -> &mut Self {
        self.ops.push(WriteOp::Put {
            key: key.into(),
            value,
        });
        self
    }

    /// Queues a text value.
    pub fn put_text(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put(key, StoredValue::Text(value.into()))
    }

    /// Queues a numeric value.
    pub fn put_number(&mut self, key: impl Into<String>, value: f32) -> &mut Self {
        self.put(key, StoredValue::Number(value))
    }

    /// Queues a text-set value, replacing the whole set.
    pub fn put_text_set(&mut self, key: impl Into<String>, value: BTreeSet<String>) -> &mut Self {
        self.put(key, StoredValue::TextSet(value))
    }

    /// Queues removal of `key`.
    pub fn remove(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Remove { key: key.into() });
        self
    }

    /// Number of queued writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch holds no writes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Queued writes in insertion order.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Consumes the batch, yielding the queued writes in insertion order.
    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// A flat, string-keyed persistence medium.
///
/// Implementors provide point reads, a full scan, and atomic batch writes; the
/// typed getters are derived from [`get`](KeyValueStore::get) and return
/// `None` both for a missing key and for a value of another type.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Reads the raw value under `key`.
    async fn get(&self, key: &str) -> Result<Option<StoredValue>>;

    /// Enumerates every stored entry. Order is unspecified.
    async fn entries(&self) -> Result<Vec<(String, StoredValue)>>;

    /// Applies every write in `batch` atomically.
    async fn apply(&self, batch: WriteBatch) -> Result<()>;

    /// Reads a text value.
    async fn get_text(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key).await?.and_then(StoredValue::into_text))
    }

    /// Reads a numeric value.
    async fn get_number(&self, key: &str) -> Result<Option<f32>> {
        Ok(self.get(key).await?.as_ref().and_then(StoredValue::as_number))
    }

    /// Reads a text-set value.
    async fn get_text_set(&self, key: &str) -> Result<Option<BTreeSet<String>>> {
        Ok(self.get(key).await?.and_then(StoredValue::into_text_set))
    }

    /// Writes a single value.
    async fn put(&self, key: &str, value: StoredValue) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.put(key, value);
        self.apply(batch).await
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        (**self).get(key).await
    }

    async fn entries(&self) -> Result<Vec<(String, StoredValue)>> {
        (**self).entries().await
    }

    async fn apply(&self, batch: WriteBatch) -> Result<()> {
        (**self).apply(batch).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_typed_accessors_reject_other_kinds() {
        let number = StoredValue::Number(4.5);
        let text = StoredValue::Text("hello".to_string());

        assert_eq!(number.as_number(), Some(4.5));
        assert_eq!(number.as_text(), None);
        assert_eq!(text.as_number(), None);
        assert_eq!(text.clone().into_text(), Some("hello".to_string()));
        assert!(text.into_text_set().is_none());
    }

    #[test]
    fn test_stored_value_json_shape() {
        let json = serde_json::to_value(StoredValue::Number(12.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "number", "value": 12.5 }));

        let set: BTreeSet<String> = ["a||1".to_string()].into_iter().collect();
        let decoded: StoredValue =
            serde_json::from_value(serde_json::json!({ "type": "text_set", "value": ["a||1"] }))
                .unwrap();
        assert_eq!(decoded, StoredValue::TextSet(set));
    }

    #[test]
    fn test_write_batch_keeps_insertion_order() {
        let mut batch = WriteBatch::new();
        batch
            .put_number("2024-01-05_earnings", 10.0)
            .put_text("2024-01-05_note", "rent")
            .remove("stale");

        assert_eq!(batch.len(), 3);
        assert!(matches!(&batch.ops()[0], WriteOp::Put { key, .. } if key == "2024-01-05_earnings"));
        assert!(matches!(&batch.ops()[2], WriteOp::Remove { key } if key == "stale"));
    }
}
