//! Visual layer model: the stack of panes and the map transform.
//!
//! # Modules
//!
//! - [`layer`]: A single layer and the `LayerContent` hit-testing seam
//! - [`stack`]: The z-ordered `LayerStack`
//! - [`view`]: The pan/zoom `MapView`

pub mod layer;
pub mod stack;
pub mod view;

pub use layer::{EmptyContent, Layer, LayerContent};
pub use stack::LayerStack;
pub use view::{MapView, MAX_ZOOM, MIN_ZOOM};
