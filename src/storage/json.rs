//! JSON file-based preference backend.
//!
//! Preferences are kept in memory and written as a small versioned JSON
//! document. Writes go to a temporary file that is then renamed over the
//! target, so a crash never leaves a half-written file behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "values": {
//!     "controller.mode": "selecting",
//!     "palette.pan.visible": "true"
//!   }
//! }
//! ```

use crate::domain::error::{ProbeMapError, Result};
use crate::storage::backend::PreferenceStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreferenceDocument {
    version: u32,

    #[serde(default)]
    values: BTreeMap<String, String>,
}

impl Default for PreferenceDocument {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            values: BTreeMap::new(),
        }
    }
}

/// JSON file preference store.
///
/// `put` only marks the store dirty; [`PreferenceStore::flush`] (or drop)
/// writes the file.
#[derive(Debug)]
pub struct JsonPreferences {
    file_path: PathBuf,
    document: PreferenceDocument,
    dirty: bool,
}

impl JsonPreferences {
    /// Opens `file_path`, creating parent directories as needed.
    ///
    /// A missing file yields an empty store. A file that cannot be parsed is
    /// logged and treated as empty; it is overwritten on the next flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the file
    /// exists but cannot be read.
    pub fn open(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        tracing::debug!(path = ?file_path, "opening preference file");

        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let document = if file_path.exists() {
            Self::load(&file_path)?
        } else {
            tracing::debug!("no preference file yet, starting empty");
            PreferenceDocument::default()
        };

        tracing::debug!(entries = document.values.len(), "preferences loaded");
        Ok(Self {
            file_path,
            document,
            dirty: false,
        })
    }

    fn load(path: &Path) -> Result<PreferenceDocument> {
        let contents = std::fs::read_to_string(path)?;
        match serde_json::from_str::<PreferenceDocument>(&contents) {
            Ok(document) => {
                if document.version != FORMAT_VERSION {
                    tracing::warn!(version = document.version, "unexpected preference format version");
                }
                Ok(document)
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "preference file unreadable, using defaults");
                Ok(PreferenceDocument::default())
            }
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn save(&mut self) -> Result<()> {
        if !self.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.document)
            .map_err(|e| ProbeMapError::Storage(format!("failed to serialize preferences: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?self.file_path, "preferences saved");
        Ok(())
    }
}

impl PreferenceStore for JsonPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.document.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) -> Result<()> {
        if self.document.values.get(key) != Some(&value) {
            self.document.values.insert(key.to_string(), value);
            self.dirty = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.save()
    }
}

impl Drop for JsonPreferences {
    fn drop(&mut self) {
        if self.dirty {
            tracing::debug!("saving dirty preferences on drop");
            if let Err(e) = self.save() {
                tracing::error!(error = %e, "failed to save preferences on drop");
            }
        }
    }
}
