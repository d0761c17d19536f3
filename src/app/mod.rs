//! Application layer assembling the control core.
//!
//! [`Canvas`] owns the bus, the task manager, the layer stack and the input
//! controller, and routes raw input to them. The embedding UI implements
//! [`CanvasHost`] to receive repaint and focus requests.
//!
//! ```text
//! InputEvent ─▶ Canvas ─▶ InputController ─▶ handler ─▶ LayerStack / SelectionOverlay
//!                 │                                        │
//!                 └──────────── CanvasBus ◀────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`canvas`]: The `Canvas` facade
//! - [`host`]: The `CanvasHost` callback trait

pub mod canvas;
pub mod host;

pub use canvas::Canvas;
pub use host::{CanvasHost, HeadlessHost};
