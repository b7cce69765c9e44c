//! Entity module - Contains the SeaORM entity definitions for the database.
//! The ledger keeps all of its state in a single key-value table.

pub mod preference;

pub use preference::{Column as PreferenceColumn, Entity as Preference, Model as PreferenceModel};
