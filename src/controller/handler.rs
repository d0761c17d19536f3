//! The seam between the controller state machine and concrete input handlers.

use super::modes::ControllerKind;
use crate::app::CanvasHost;
use crate::domain::PointerEvent;
use crate::layers::LayerStack;

/// Non-owning view of the collaborators a handler may touch for one event.
pub struct HandlerContext<'a> {
    pub layers: &'a mut LayerStack,
    pub host: &'a dyn CanvasHost,
}

impl<'a> HandlerContext<'a> {
    pub fn new(layers: &'a mut LayerStack, host: &'a dyn CanvasHost) -> Self {
        Self { layers, host }
    }
}

/// A concrete interpretation of pointer input.
///
/// The controller guarantees `stop` on the outgoing handler runs before
/// `start` on the incoming one, and only the started handler sees events.
pub trait InputHandler: Send {
    fn kind(&self) -> ControllerKind;

    /// Called when the handler becomes the active one.
    fn start(&mut self) {}

    /// Called when another handler takes over. Must abandon in-flight gestures.
    fn stop(&mut self) {}

    fn handle_pointer(&mut self, event: &PointerEvent, ctx: &mut HandlerContext<'_>);
}
