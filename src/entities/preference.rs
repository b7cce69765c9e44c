//! Preference entity - the flat key-value table behind [`crate::store::SqliteStore`].
//!
//! One row per key. Day record fields, the shopping list, and the theme
//! preference all share this table and are told apart only by key naming.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Preference database model - stores one typed value per key
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "preferences")]
pub struct Model {
    /// Storage key (e.g., `"2024-01-05_earnings"`, `"shoppingItems"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Tagged JSON encoding of a [`crate::store::StoredValue`]
    pub value: Json,
    /// When this key was last written
    pub updated_at: DateTime,
}

/// `Preference` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
