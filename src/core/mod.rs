//! Core business logic - framework-agnostic day records, shopping list, theme,
//! and calendar arithmetic.

pub mod calendar;
pub mod day_record;
pub mod shopping;
pub mod theme;

pub use calendar::YearMonth;
pub use day_record::{DayRecord, DayRecordStore};
pub use shopping::{ShoppingItem, ShoppingListStore};
pub use theme::{ThemeMode, ThemeStore};

/// Outcome of scanning persisted entries into memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Entries decoded and folded into memory
    pub applied: usize,
    /// Entries that were skipped and logged
    pub skipped: usize,
}
