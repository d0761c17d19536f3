//! Typed view over the persisted canvas preferences.

use crate::controller::ControllerMode;
use crate::domain::error::Result;
use crate::storage::backend::PreferenceStore;
use chrono::{DateTime, Utc};

pub const KEY_MODE: &str = "controller.mode";
pub const KEY_PAN_PALETTE: &str = "palette.pan.visible";
pub const KEY_SELECT_PALETTE: &str = "palette.select.visible";
pub const KEY_SAVED_AT: &str = "preferences.saved_at";

/// Preferences restored at startup and written back on save.
///
/// Override modes are transient and never restored: a persisted
/// `panning-select-override` comes back as `panning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPreferences {
    pub mode: ControllerMode,
    pub pan_palette_visible: bool,
    pub select_palette_visible: bool,
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for CanvasPreferences {
    fn default() -> Self {
        Self {
            mode: ControllerMode::default(),
            pan_palette_visible: true,
            select_palette_visible: true,
            saved_at: None,
        }
    }
}

impl CanvasPreferences {
    /// Reads preferences from `store`, substituting defaults for missing or
    /// malformed values.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();

        let mode = match store.get(KEY_MODE) {
            Some(raw) => match raw.parse::<ControllerMode>() {
                Ok(mode) => mode.base(),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "ignoring stored controller mode");
                    defaults.mode
                }
            },
            None => defaults.mode,
        };

        let saved_at = store.get(KEY_SAVED_AT).and_then(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|e| tracing::warn!(value = %raw, error = %e, "ignoring stored timestamp"))
                .ok()
        });

        let prefs = Self {
            mode,
            pan_palette_visible: read_flag(store, KEY_PAN_PALETTE, defaults.pan_palette_visible),
            select_palette_visible: read_flag(store, KEY_SELECT_PALETTE, defaults.select_palette_visible),
            saved_at,
        };
        tracing::debug!(mode = %prefs.mode, "preferences restored");
        prefs
    }

    /// Writes every preference to `store` and flushes it, stamping
    /// `saved_at` with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to record or persist a value.
    pub fn save(&mut self, store: &mut dyn PreferenceStore) -> Result<()> {
        let now = Utc::now();
        store.put(KEY_MODE, self.mode.name().to_string())?;
        store.put(KEY_PAN_PALETTE, self.pan_palette_visible.to_string())?;
        store.put(KEY_SELECT_PALETTE, self.select_palette_visible.to_string())?;
        store.put(KEY_SAVED_AT, now.to_rfc3339())?;
        store.flush()?;
        self.saved_at = Some(now);
        Ok(())
    }
}

fn read_flag(store: &dyn PreferenceStore, key: &str, default: bool) -> bool {
    match store.get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring malformed flag");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPreferences;

    #[test]
    fn empty_store_yields_defaults() {
        let prefs = CanvasPreferences::load(&MemoryPreferences::new());
        assert_eq!(prefs, CanvasPreferences::default());
    }

    #[test]
    fn override_modes_restore_as_base_mode() {
        let store = MemoryPreferences::with_entries([(KEY_MODE, "selecting-pan-override")]);
        assert_eq!(CanvasPreferences::load(&store).mode, ControllerMode::Selecting);
    }

    #[test]
    fn malformed_values_fall_back() {
        let store = MemoryPreferences::with_entries([
            (KEY_MODE, "zooming"),
            (KEY_PAN_PALETTE, "maybe"),
            (KEY_SELECT_PALETTE, "false"),
            (KEY_SAVED_AT, "yesterday"),
        ]);
        let prefs = CanvasPreferences::load(&store);
        assert_eq!(prefs.mode, ControllerMode::Panning);
        assert!(prefs.pan_palette_visible);
        assert!(!prefs.select_palette_visible);
        assert_eq!(prefs.saved_at, None);
    }

    #[test]
    fn save_then_load_restores_values() {
        let mut store = MemoryPreferences::new();
        let mut prefs = CanvasPreferences {
            mode: ControllerMode::Selecting,
            pan_palette_visible: false,
            select_palette_visible: true,
            saved_at: None,
        };
        prefs.save(&mut store).unwrap();
        assert!(prefs.saved_at.is_some());

        let restored = CanvasPreferences::load(&store);
        assert_eq!(restored.mode, ControllerMode::Selecting);
        assert!(!restored.pan_palette_visible);
        assert!(restored.select_palette_visible);
        assert!(restored.saved_at.is_some());
    }
}
