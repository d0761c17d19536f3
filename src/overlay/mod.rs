//! Overlays drawn above the layer stack by the rendering collaborator.

pub mod selection;

pub use selection::SelectionOverlay;
