//! Storage layer for persisted canvas preferences.
//!
//! # Modules
//!
//! - `backend`: `PreferenceStore` trait and the in-memory store
//! - `json`: JSON file-based store with atomic writes
//! - `preferences`: Typed `CanvasPreferences` over any store

pub mod backend;
pub mod json;
pub mod preferences;

pub use backend::{MemoryPreferences, PreferenceStore};
pub use json::JsonPreferences;
pub use preferences::CanvasPreferences;
