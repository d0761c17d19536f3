//! Probemap: the interactive control core of a layered map canvas.
//!
//! Probemap drives a map viewer that stacks a tile map, data overlays, probe
//! markers and tool chrome. It provides:
//! - A z-ordered layer stack with visibility toggles and hit testing
//! - A modal input controller (pan or select, with CTRL/SHIFT overrides)
//! - A rubber-band selection overlay with an animated border
//! - A keyed publish/subscribe bus with a delivery barrier
//! - A periodic task manager backing the animation
//! - Persisted preferences for mode and palette visibility

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Replay binary (main.rs)                            │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Canvas facade
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Controller    │   │ Layers        │   │ Overlay       │
//! │ (controller/) │   │ (layers/)     │   │ (overlay/)    │
//! │ - Mode FSM    │   │ - Z-order     │   │ - Rubber band │
//! │ - Pan handler │   │ - Map view    │   │ - Stroke      │
//! │ - Select      │   │ - Hit testing │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Event bus (bus/) and animation scheduler           │
//! │  (animation/)                                       │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/), Storage (storage/),              │
//! │  Observability (observability/)                     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`animation`]: Periodic task scheduling and the stroke animation
//! - [`app`]: The `Canvas` facade and the `CanvasHost` callbacks
//! - [`bus`]: Keyed publish/subscribe with asynchronous delivery
//! - [`controller`]: Mode state machine and input handlers
//! - [`domain`]: Errors, geometry and input events
//! - [`infrastructure`]: Platform paths
//! - [`layers`]: Layer stack and map view
//! - [`overlay`]: Selection overlay
//! - [`storage`]: Preference persistence
//! - `observability`: Tracing setup
//!
//! # Configuration
//!
//! ```toml
//! dispatch_threads = 1
//! stroke_period_ms = 250
//! symmetric_overrides = false
//! preferences_path = "/home/me/.local/share/probemap/preferences.json"
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust
//! use probemap::app::HeadlessHost;
//! use probemap::layers::Layer;
//! use probemap::{initialize, Config};
//! use std::sync::Arc;
//!
//! let mut canvas = initialize(&Config::default(), Arc::new(HeadlessHost))?;
//! canvas.add_layer(Layer::empty("tiles", 0));
//! canvas.add_layer(Layer::empty("markers", 10));
//! assert_eq!(canvas.layers().len(), 2);
//! # Ok::<(), probemap::ProbeMapError>(())
//! ```

pub mod animation;
pub mod app;
pub mod bus;
pub mod controller;
pub mod domain;
pub mod infrastructure;
pub mod layers;
pub mod overlay;
pub mod storage;

pub mod observability;

pub use app::{Canvas, CanvasHost};
pub use controller::ControllerMode;
pub use domain::{ProbeMapError, Result};

use infrastructure::expand_tilde;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_DISPATCH_THREADS: usize = 1;
const DEFAULT_STROKE_PERIOD_MS: u64 = 250;

/// Canvas configuration.
///
/// Every field is optional in TOML; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threads delivering bus events. One thread keeps delivery in publish
    /// order across separate publishes. Default: 1
    pub dispatch_threads: usize,

    /// Period of the selection stroke animation. Default: 250
    pub stroke_period_ms: u64,

    /// Delay before the first stroke tick. Default: 0
    pub stroke_initial_delay_ms: u64,

    /// Enables SHIFT-press from panning and CTRL-release from the pan
    /// override. Default: false
    pub symmetric_overrides: bool,

    /// Preference file. `None` keeps preferences in memory.
    pub preferences_path: Option<PathBuf>,

    /// Tracing filter directive. Options: `trace`, `debug`, `info`, `warn`,
    /// `error`. Default: `"info"`
    pub trace_level: Option<String>,

    /// File receiving one JSON line per finished span.
    pub trace_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch_threads: DEFAULT_DISPATCH_THREADS,
            stroke_period_ms: DEFAULT_STROKE_PERIOD_MS,
            stroke_initial_delay_ms: 0,
            symmetric_overrides: false,
            preferences_path: None,
            trace_level: None,
            trace_file: None,
        }
    }
}

impl Config {
    /// Parses configuration from a flat string map.
    ///
    /// Unparseable numbers and flags fall back to their defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use probemap::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("dispatch_threads".to_string(), "4".to_string());
    /// map.insert("stroke_period_ms".to_string(), "fast".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.dispatch_threads, 4);
    /// assert_eq!(config.stroke_period_ms, 250);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let dispatch_threads = map
            .get("dispatch_threads")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.dispatch_threads);

        let stroke_period_ms = map
            .get("stroke_period_ms")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(defaults.stroke_period_ms);

        let stroke_initial_delay_ms = map
            .get("stroke_initial_delay_ms")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(defaults.stroke_initial_delay_ms);

        let symmetric_overrides = map
            .get("symmetric_overrides")
            .and_then(|s| s.trim().parse::<bool>().ok())
            .unwrap_or(defaults.symmetric_overrides);

        Self {
            dispatch_threads,
            stroke_period_ms,
            stroke_initial_delay_ms,
            symmetric_overrides,
            preferences_path: map.get("preferences_path").map(PathBuf::from),
            trace_level: map.get("trace_level").cloned(),
            trace_file: map.get("trace_file").map(PathBuf::from),
        }
        .with_expanded_paths()
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeMapError::Config`] if the text is not valid TOML or a
    /// field has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ProbeMapError::Config(e.to_string()))?;
        if config.dispatch_threads == 0 {
            return Err(ProbeMapError::Config(
                "dispatch_threads must be at least 1".to_string(),
            ));
        }
        Ok(config.with_expanded_paths())
    }

    fn with_expanded_paths(mut self) -> Self {
        self.preferences_path = self.preferences_path.as_deref().map(expand_tilde);
        self.trace_file = self.trace_file.as_deref().map(expand_tilde);
        self
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ProbeMapError::Config(msg) => {
                ProbeMapError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }
}

/// Builds a canvas from configuration.
///
/// The preference store is a JSON file when `preferences_path` is set and an
/// in-memory map otherwise.
///
/// # Errors
///
/// Returns an error if the preference file cannot be opened or background
/// threads cannot be spawned.
pub fn initialize(config: &Config, host: std::sync::Arc<dyn CanvasHost>) -> Result<Canvas> {
    tracing::debug!(?config, "initializing probemap canvas");
    Canvas::from_config(config, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fields_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            stroke_period_ms = 100
            symmetric_overrides = true
            trace_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.stroke_period_ms, 100);
        assert!(config.symmetric_overrides);
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
        assert_eq!(config.dispatch_threads, 1);
        assert_eq!(config.preferences_path, None);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn toml_type_errors_are_config_errors() {
        let err = Config::from_toml_str("stroke_period_ms = \"slow\"").unwrap_err();
        assert!(matches!(err, ProbeMapError::Config(_)));

        let err = Config::from_toml_str("dispatch_threads = 0").unwrap_err();
        assert!(matches!(err, ProbeMapError::Config(_)));
    }

    #[test]
    fn map_falls_back_on_invalid_values() {
        let map: BTreeMap<String, String> = [
            ("dispatch_threads", "0"),
            ("symmetric_overrides", "yes"),
            ("preferences_path", "/tmp/prefs.json"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = Config::from_map(&map);
        assert_eq!(config.dispatch_threads, 1);
        assert!(!config.symmetric_overrides);
        assert_eq!(config.preferences_path, Some(PathBuf::from("/tmp/prefs.json")));
    }

    #[test]
    fn config_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probemap.toml");
        std::fs::write(&path, "dispatch_threads = 2\n").unwrap();

        assert_eq!(Config::from_file(&path).unwrap().dispatch_threads, 2);
        assert!(matches!(
            Config::from_file(dir.path().join("missing.toml")),
            Err(ProbeMapError::Io(_))
        ));
    }
}
