//! SQLite-backed [`KeyValueStore`] using the `preferences` table.
//!
//! Each row holds one key and its [`StoredValue`] serialized as tagged JSON.
//! Batches run inside a single database transaction, so a day record's three
//! field keys are always written together.

use super::{KeyValueStore, StoredValue, WriteBatch, WriteOp};
use crate::{
    entities::{Preference, preference},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use tracing::{debug, instrument, warn};

/// Key-value store persisted in SQLite through `SeaORM`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Wraps an open connection. The `preferences` table must already exist;
    /// see [`crate::config::database::create_tables`].
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Decodes a row, logging and discarding values whose JSON no longer matches
/// any [`StoredValue`] shape.
fn decode_row(row: preference::Model) -> Option<(String, StoredValue)> {
    match serde_json::from_value::<StoredValue>(row.value) {
        Ok(value) => Some((row.key, value)),
        Err(e) => {
            warn!(key = %row.key, error = %e, "Discarding undecodable stored value");
            None
        }
    }
}

impl KeyValueStore for SqliteStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        let row = Preference::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(row.and_then(decode_row).map(|(_, value)| value))
    }

    #[instrument(skip(self))]
    async fn entries(&self) -> Result<Vec<(String, StoredValue)>> {
        let rows = Preference::find()
            .order_by_asc(preference::Column::Key)
            .all(&self.db)
            .await?;
        debug!("Scanned {} stored entries", rows.len());
        Ok(rows.into_iter().filter_map(decode_row).collect())
    }

    #[instrument(skip(self, batch), fields(ops = batch.len()))]
    async fn apply(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        let now = Utc::now().naive_utc();

        for op in batch.into_ops() {
            match op {
                WriteOp::Put { key, value } => {
                    let row = preference::ActiveModel {
                        key: Set(key),
                        value: Set(serde_json::to_value(&value)?),
                        updated_at: Set(now),
                    };
                    Preference::insert(row)
                        .on_conflict(
                            OnConflict::column(preference::Column::Key)
                                .update_columns([
                                    preference::Column::Value,
                                    preference::Column::UpdatedAt,
                                ])
                                .to_owned(),
                        )
                        .exec_without_returning(&txn)
                        .await?;
                }
                WriteOp::Remove { key } => {
                    Preference::delete_by_id(key).exec(&txn).await?;
                }
            }
        }

        // All writes in the batch land together or not at all
        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{init_test_tracing, setup_test_db};
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn test_put_and_get_each_kind() -> Result<()> {
        init_test_tracing();
        let store = setup_test_db().await?;

        let set: BTreeSet<String> = ["Milk||2".to_string(), "Eggs||12".to_string()]
            .into_iter()
            .collect();
        let mut batch = WriteBatch::new();
        batch
            .put_number("2024-03-01_earnings", 42.5)
            .put_text("2024-03-01_note", "market day")
            .put_text_set("shoppingItems", set.clone());
        store.apply(batch).await?;

        assert_eq!(store.get_number("2024-03-01_earnings").await?, Some(42.5));
        assert_eq!(
            store.get_text("2024-03-01_note").await?,
            Some("market day".to_string())
        );
        assert_eq!(store.get_text_set("shoppingItems").await?, Some(set));
        assert_eq!(store.get("absent").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_key() -> Result<()> {
        init_test_tracing();
        let store = setup_test_db().await?;

        store.put("themePreference", StoredValue::Text("DARK".to_string())).await?;
        store.put("themePreference", StoredValue::Text("LIGHT".to_string())).await?;

        assert_eq!(
            store.get_text("themePreference").await?,
            Some("LIGHT".to_string())
        );
        assert_eq!(store.entries().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_noop() -> Result<()> {
        init_test_tracing();
        let store = setup_test_db().await?;

        let mut batch = WriteBatch::new();
        batch.remove("does-not-exist");
        store.apply(batch).await?;

        assert!(store.entries().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_undecodable_row_is_skipped() -> Result<()> {
        init_test_tracing();
        let store = setup_test_db().await?;

        store.put("2024-03-02_spendings", StoredValue::Number(3.0)).await?;
        preference::ActiveModel {
            key: Set("legacy".to_string()),
            value: Set(serde_json::json!({ "unexpected": true })),
            updated_at: Set(Utc::now().naive_utc()),
        }
        .insert(store.connection())
        .await?;

        let entries = store.entries().await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "2024-03-02_spendings");
        assert_eq!(store.get("legacy").await?, None);
        Ok(())
    }
}
