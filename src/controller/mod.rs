//! Input controller layer: modes, the state machine, and concrete handlers.
//!
//! ```text
//! InputEvent ─▶ InputController ─▶ active InputHandler ─▶ LayerStack / SelectionOverlay
//!                    ▲                     │
//!              key-chord edges             └──▶ CanvasBus events
//! ```
//!
//! # Modules
//!
//! - [`modes`]: `ControllerMode` / `ControllerKind` enums
//! - [`fsm`]: The `InputController` state machine
//! - [`handler`]: The `InputHandler` trait and per-event context
//! - [`panning`]: Drag-to-pan and zoom handler
//! - [`selecting`]: Area and click selection handler

pub mod fsm;
pub mod handler;
pub mod modes;
pub mod panning;
pub mod selecting;

pub use fsm::{ControllerOptions, InputController, ModeReader};
pub use handler::{HandlerContext, InputHandler};
pub use modes::{ControllerKind, ControllerMode, UnknownMode};
pub use panning::PanningHandler;
pub use selecting::SelectingHandler;
