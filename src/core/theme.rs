//! Theme preference persistence.
//!
//! Only the stored choice lives here; applying it to a UI is the caller's job.

use crate::{
    errors::{Error, Result},
    store::{KeyValueStore, StoredValue},
};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument, warn};

/// Storage key holding the theme name.
pub const THEME_PREFERENCE_KEY: &str = "themePreference";

/// The user's theme choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    /// Always light
    Light,
    /// Always dark
    Dark,
    /// Follow the operating system
    #[default]
    System,
}

impl ThemeMode {
    /// Persisted name (`LIGHT`, `DARK`, `SYSTEM`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "LIGHT",
            Self::Dark => "DARK",
            Self::System => "SYSTEM",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LIGHT" => Ok(Self::Light),
            "DARK" => Ok(Self::Dark),
            "SYSTEM" => Ok(Self::System),
            other => Err(Error::Parse {
                message: format!("unknown theme '{other}'"),
            }),
        }
    }
}

/// Reads and writes the theme preference.
#[derive(Debug)]
pub struct ThemeStore<S> {
    store: S,
}

impl<S: KeyValueStore> ThemeStore<S> {
    /// Creates a theme store over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The stored theme, [`ThemeMode::System`] when unset.
    ///
    /// A corrupt value is replaced with `SYSTEM` in storage before returning.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<ThemeMode> {
        let Some(value) = self.store.get(THEME_PREFERENCE_KEY).await? else {
            return Ok(ThemeMode::System);
        };

        match value.as_text().map(str::parse::<ThemeMode>) {
            Some(Ok(mode)) => Ok(mode),
            Some(Err(e)) => {
                warn!(error = %e, "Invalid theme stored. Resetting to SYSTEM");
                self.save(ThemeMode::System).await?;
                Ok(ThemeMode::System)
            }
            None => {
                warn!(kind = value.kind(), "Theme stored with unexpected type. Resetting to SYSTEM");
                self.save(ThemeMode::System).await?;
                Ok(ThemeMode::System)
            }
        }
    }

    /// Persists `mode`.
    #[instrument(skip(self))]
    pub async fn save(&self, mode: ThemeMode) -> Result<()> {
        self.store
            .put(THEME_PREFERENCE_KEY, StoredValue::Text(mode.as_str().to_string()))
            .await?;
        info!("Theme preference set to {}", mode);
        Ok(())
    }
}
