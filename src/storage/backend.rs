//! Preference store abstraction.
//!
//! This module defines the [`PreferenceStore`] trait the canvas uses to read
//! and write persisted UI preferences. The core only ever stores short string
//! values under string keys; typed decoding lives in
//! [`crate::storage::preferences`].

use crate::domain::error::Result;
use std::collections::BTreeMap;

/// Abstraction over persistent key-value preference backends.
///
/// # Implementations
///
/// - [`crate::storage::JsonPreferences`]: JSON file with atomic writes
/// - [`MemoryPreferences`]: process-local map, used when no file is configured
pub trait PreferenceStore: Send {
    /// Returns the stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to record the value.
    fn put(&mut self, key: &str, value: String) -> Result<()>;

    /// Persists pending writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-memory preference store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
