//! Event bus decoupling input controllers from the views that react to them.
//!
//! # Modules
//!
//! - [`dispatch`]: Worker pool executing deliveries off the publishing thread
//! - [`event_bus`]: Generic copy-on-write publish/subscribe bus
//! - [`events`]: The canvas event vocabulary (`EventKind` / `CanvasEvent`)

pub mod dispatch;
pub mod event_bus;
pub mod events;

pub use dispatch::Dispatcher;
pub use event_bus::{Awaiter, EventBus, Listener, ListenerId};
pub use events::{CanvasBus, CanvasBusExt, CanvasEvent, CanvasListener, EventKind};
