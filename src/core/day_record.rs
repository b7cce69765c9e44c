//! Day record business logic.
//!
//! A day record is the earnings/spendings/note triple attached to one calendar
//! date. Records are cached in memory and persisted as three independent keys
//! per date:
//!
//! ```text
//! 2024-01-05_earnings  -> number
//! 2024-01-05_spendings -> number
//! 2024-01-05_note      -> text
//! ```
//!
//! A date with nothing stored reads exactly like a record with all-default
//! fields, so callers never need to distinguish "untouched" from "reset".

use super::LoadSummary;
use crate::{
    core::calendar::YearMonth,
    errors::{Error, Result},
    store::{KeyValueStore, StoredValue, WriteBatch},
};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

const KEY_SEPARATOR: char = '_';
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One day's financial and note state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayRecord {
    /// Money earned that day
    pub earnings: f32,
    /// Money spent that day
    pub spendings: f32,
    /// Free-form note
    pub note: String,
}

impl DayRecord {
    /// Creates a record from its three fields.
    #[must_use]
    pub fn new(earnings: f32, spendings: f32, note: impl Into<String>) -> Self {
        Self {
            earnings,
            spendings,
            note: note.into(),
        }
    }

    /// Earnings minus spendings.
    #[must_use]
    pub fn profit(&self) -> f32 {
        self.earnings - self.spendings
    }
}

/// The per-field discriminator used as the key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayField {
    /// `<date>_earnings`
    Earnings,
    /// `<date>_spendings`
    Spendings,
    /// `<date>_note`
    Note,
}

impl DayField {
    /// Key suffix for this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earnings => "earnings",
            Self::Spendings => "spendings",
            Self::Note => "note",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "earnings" => Some(Self::Earnings),
            "spendings" => Some(Self::Spendings),
            "note" => Some(Self::Note),
            _ => None,
        }
    }

    /// Folds a stored value into `record`. A value of the wrong type resets the
    /// field to its default.
    fn apply(self, record: &mut DayRecord, value: StoredValue) {
        match self {
            Self::Earnings => record.earnings = value.as_number().unwrap_or(0.0),
            Self::Spendings => record.spendings = value.as_number().unwrap_or(0.0),
            Self::Note => record.note = value.into_text().unwrap_or_default(),
        }
    }
}

/// Why a stored key is not a day record key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordKeyError {
    /// No `_` in the key at all; usually another feature's key
    #[error("no field separator")]
    MissingSeparator,
    /// The part before `_` is not a canonical `YYYY-MM-DD` date
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    /// The part after `_` is not a known field
    #[error("unknown field '{0}'")]
    UnknownField(String),
}

/// Builds the storage key for one field of one date.
#[must_use]
pub fn record_key(date: NaiveDate, field: DayField) -> String {
    format!(
        "{}{KEY_SEPARATOR}{}",
        date.format(DATE_FORMAT),
        field.as_str()
    )
}

/// Splits a storage key back into its date and field.
pub fn parse_record_key(key: &str) -> std::result::Result<(NaiveDate, DayField), RecordKeyError> {
    let (date_part, field_part) = key
        .split_once(KEY_SEPARATOR)
        .ok_or(RecordKeyError::MissingSeparator)?;

    let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .ok()
        // Only the canonical zero-padded form is accepted
        .filter(|d| d.format(DATE_FORMAT).to_string() == date_part)
        .ok_or_else(|| RecordKeyError::InvalidDate(date_part.to_string()))?;

    let field = DayField::from_suffix(field_part)
        .ok_or_else(|| RecordKeyError::UnknownField(field_part.to_string()))?;

    Ok((date, field))
}

/// In-memory cache plus durable persistence of day records.
#[derive(Debug)]
pub struct DayRecordStore<S> {
    store: S,
    records: HashMap<NaiveDate, DayRecord>,
}

impl<S: KeyValueStore> DayRecordStore<S> {
    /// Creates an empty cache over `store`. Call [`load_all`](Self::load_all)
    /// to pick up previously persisted records.
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: HashMap::new(),
        }
    }

    /// The record for `date`, or an all-default record if none is cached.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> DayRecord {
        self.records.get(&date).cloned().unwrap_or_default()
    }

    /// Replaces the record for `date` and persists its three field keys in one batch.
    ///
    /// The cache is only updated once the write has been applied. Non-finite
    /// amounts are rejected since they cannot be stored as numbers.
    #[instrument(skip(self, record))]
    pub async fn put(&mut self, date: NaiveDate, record: DayRecord) -> Result<()> {
        for amount in [record.earnings, record.spendings] {
            if !amount.is_finite() {
                return Err(Error::InvalidAmount { amount });
            }
        }

        let mut batch = WriteBatch::new();
        batch
            .put_number(record_key(date, DayField::Earnings), record.earnings)
            .put_number(record_key(date, DayField::Spendings), record.spendings)
            .put_text(record_key(date, DayField::Note), record.note.clone());

        self.store.apply(batch).await?;
        debug!(
            earnings = record.earnings,
            spendings = record.spendings,
            "Saved day record"
        );
        self.records.insert(date, record);
        Ok(())
    }

    /// Scans every persisted entry and folds day record fields into the cache.
    ///
    /// Keys that are not `<date>_<field>` are skipped and logged; one bad key
    /// never stops the scan.
    #[instrument(skip(self))]
    pub async fn load_all(&mut self) -> Result<LoadSummary> {
        let entries = self.store.entries().await?;
        let mut summary = LoadSummary::default();

        for (key, value) in entries {
            match parse_record_key(&key) {
                Ok((date, field)) => {
                    field.apply(self.records.entry(date).or_default(), value);
                    summary.applied += 1;
                }
                Err(RecordKeyError::MissingSeparator) => {
                    debug!(key = %key, "Ignoring non day record key");
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Skipping malformed day record key");
                    summary.skipped += 1;
                }
            }
        }

        info!(
            applied = summary.applied,
            skipped = summary.skipped,
            days = self.records.len(),
            "Loaded day records"
        );
        Ok(summary)
    }

    /// Sum of earnings minus spendings over every day of `month`.
    ///
    /// Days without a record contribute zero. Accumulates in `f64`.
    #[must_use]
    pub fn monthly_profit(&self, month: YearMonth) -> f64 {
        month
            .days()
            .filter_map(|day| self.records.get(&day))
            .map(|r| f64::from(r.earnings) - f64::from(r.spendings))
            .sum()
    }

    /// Every day of `month` paired with its record, defaults included.
    #[must_use]
    pub fn records_in_month(&self, month: YearMonth) -> Vec<(NaiveDate, DayRecord)> {
        month.days().map(|day| (day, self.get(day))).collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_utils::{date, init_test_tracing, setup_test_db};

    #[test]
    fn test_record_key_format() {
        assert_eq!(
            record_key(date(2024, 1, 5), DayField::Earnings),
            "2024-01-05_earnings"
        );
        assert_eq!(record_key(date(2024, 12, 31), DayField::Note), "2024-12-31_note");
    }

    #[test]
    fn test_parse_record_key() {
        assert_eq!(
            parse_record_key("2024-01-05_spendings"),
            Ok((date(2024, 1, 5), DayField::Spendings))
        );
        assert_eq!(
            parse_record_key("themePreference"),
            Err(RecordKeyError::MissingSeparator)
        );
        assert_eq!(
            parse_record_key("not-a-date_earnings"),
            Err(RecordKeyError::InvalidDate("not-a-date".to_string()))
        );
        assert_eq!(
            parse_record_key("2024-02-30_note"),
            Err(RecordKeyError::InvalidDate("2024-02-30".to_string()))
        );
        assert_eq!(
            parse_record_key("2024-1-5_note"),
            Err(RecordKeyError::InvalidDate("2024-1-5".to_string()))
        );
        assert_eq!(
            parse_record_key("2024-01-05_bogusfield"),
            Err(RecordKeyError::UnknownField("bogusfield".to_string()))
        );
    }

    #[test]
    fn test_get_unwritten_date_is_default() {
        let days = DayRecordStore::new(MemoryStore::new());
        let record = days.get(date(2024, 6, 1));

        assert_eq!(record.earnings, 0.0);
        assert_eq!(record.spendings, 0.0);
        assert!(record.note.is_empty());
    }

    #[tokio::test]
    async fn test_put_then_get_same_store() -> Result<()> {
        let mut days = DayRecordStore::new(MemoryStore::new());
        let record = DayRecord::new(120.0, 35.5, "paid rent");

        days.put(date(2024, 6, 1), record.clone()).await?;

        assert_eq!(days.get(date(2024, 6, 1)), record);
        Ok(())
    }

    #[tokio::test]
    async fn test_put_writes_three_keys() -> Result<()> {
        let store = MemoryStore::new();
        let mut days = DayRecordStore::new(&store);

        days.put(date(2024, 6, 1), DayRecord::new(1.0, 2.0, "x")).await?;

        assert_eq!(store.len(), 3);
        assert_eq!(store.get_number("2024-06-01_earnings").await?, Some(1.0));
        assert_eq!(store.get_number("2024-06-01_spendings").await?, Some(2.0));
        assert_eq!(store.get_text("2024-06-01_note").await?, Some("x".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_put_rejects_non_finite() -> Result<()> {
        init_test_tracing();
        let store = setup_test_db().await?;
        let mut days = DayRecordStore::new(&store);

        let result = days
            .put(date(2024, 5, 1), DayRecord::new(f32::INFINITY, 1.0, "n"))
            .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));
        let result = days
            .put(date(2024, 5, 1), DayRecord::new(1.0, f32::NAN, "n"))
            .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));

        // Nothing cached, nothing persisted
        assert_eq!(days.get(date(2024, 5, 1)), DayRecord::default());
        assert!(store.entries().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_round_trip_through_fresh_store() -> Result<()> {
        init_test_tracing();
        let store = setup_test_db().await?;
        let record = DayRecord::new(99.25, 10.5, "sold the bike");

        let mut writer = DayRecordStore::new(&store);
        writer.put(date(2024, 2, 29), record.clone()).await?;

        let mut reader = DayRecordStore::new(&store);
        let summary = reader.load_all().await?;

        assert_eq!(summary.applied, 3);
        assert_eq!(reader.get(date(2024, 2, 29)), record);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_all_skips_malformed_keys() -> Result<()> {
        init_test_tracing();
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch
            .put_number("not-a-date_earnings", 50.0)
            .put_text("2024-01-05_bogusfield", "?")
            .put_text("themePreference", "DARK")
            .put_number("2024-01-05_earnings", 20.0)
            .put_text("2024-01-05_note", "kept");
        store.apply(batch).await?;

        let mut days = DayRecordStore::new(&store);
        let summary = days.load_all().await?;

        assert_eq!(summary.applied, 2);
        assert_eq!(summary.skipped, 3);
        assert_eq!(days.get(date(2024, 1, 5)), DayRecord::new(20.0, 0.0, "kept"));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_all_wrong_type_reads_as_default() -> Result<()> {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch
            .put_text("2024-01-06_earnings", "lots")
            .put_number("2024-01-06_spendings", 4.0)
            .put_number("2024-01-06_note", 7.0);
        store.apply(batch).await?;

        let mut days = DayRecordStore::new(&store);
        days.load_all().await?;

        assert_eq!(days.get(date(2024, 1, 6)), DayRecord::new(0.0, 4.0, ""));
        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_profit_sums_days() -> Result<()> {
        let mut days = DayRecordStore::new(MemoryStore::new());
        days.put(date(2024, 3, 1), DayRecord::new(10.0, 2.0, "")).await?;
        days.put(date(2024, 3, 2), DayRecord::default()).await?;
        days.put(date(2024, 3, 3), DayRecord::new(5.0, 5.0, "")).await?;
        // Outside the month, must not count
        days.put(date(2024, 4, 1), DayRecord::new(1000.0, 0.0, "")).await?;
        days.put(date(2024, 2, 29), DayRecord::new(1000.0, 0.0, "")).await?;

        assert_eq!(days.monthly_profit(YearMonth::new(2024, 3)?), 8.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_profit_leap_february() -> Result<()> {
        let mut days = DayRecordStore::new(MemoryStore::new());
        for day in YearMonth::new(2024, 2)?.days() {
            days.put(day, DayRecord::new(1.0, 0.0, "")).await?;
        }
        for day in YearMonth::new(2023, 2)?.days() {
            days.put(day, DayRecord::new(1.0, 0.0, "")).await?;
        }
        // 2023-02-29 does not exist; 2023-03-01 must not leak into February
        days.put(date(2023, 3, 1), DayRecord::new(1.0, 0.0, "")).await?;

        assert_eq!(days.monthly_profit(YearMonth::new(2024, 2)?), 29.0);
        assert_eq!(days.monthly_profit(YearMonth::new(2023, 2)?), 28.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_profit_can_be_negative() -> Result<()> {
        let mut days = DayRecordStore::new(MemoryStore::new());
        days.put(date(2024, 7, 31), DayRecord::new(0.0, 12.5, "")).await?;

        assert_eq!(days.monthly_profit(YearMonth::new(2024, 7)?), -12.5);
        assert_eq!(days.monthly_profit(YearMonth::new(2024, 8)?), 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_records_in_month_covers_every_day() -> Result<()> {
        let mut days = DayRecordStore::new(MemoryStore::new());
        days.put(date(2024, 4, 15), DayRecord::new(3.0, 1.0, "mid")).await?;

        let month = days.records_in_month(YearMonth::new(2024, 4)?);
        assert_eq!(month.len(), 30);
        assert_eq!(month[14], (date(2024, 4, 15), DayRecord::new(3.0, 1.0, "mid")));
        assert_eq!(month[0].1, DayRecord::default());
        Ok(())
    }
}
