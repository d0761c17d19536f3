//! Rubber-band area selection and click selection.
//!
//! A gesture runs from a primary press to its release. While it is active the
//! overlay tracks the rectangle and the stroke animation runs. On release the
//! handler always clears the previous selection before announcing the new one:
//! it waits for `DeselectAll` to be delivered and only then publishes the
//! area or component selection.

use super::handler::{HandlerContext, InputHandler};
use super::modes::ControllerKind;
use crate::animation::StrokeAnimator;
use crate::bus::{CanvasBus, CanvasBusExt, CanvasEvent};
use crate::domain::{PointerAction, PointerEvent};
use crate::overlay::SelectionOverlay;
use std::sync::Arc;

/// Draws the selection rectangle and publishes selection events.
#[derive(Debug)]
pub struct SelectingHandler {
    bus: CanvasBus,
    overlay: Arc<SelectionOverlay>,
    animator: Arc<StrokeAnimator>,
}

impl SelectingHandler {
    #[must_use]
    pub fn new(bus: CanvasBus, overlay: Arc<SelectionOverlay>, animator: Arc<StrokeAnimator>) -> Self {
        Self {
            bus,
            overlay,
            animator,
        }
    }

    fn deselect_all_and_wait(&self) {
        self.bus.emit_and_await(CanvasEvent::DeselectAll).wait();
    }

    fn finish(&self, event: &PointerEvent, ctx: &HandlerContext<'_>) {
        self.overlay.update(event.position);
        let Some(rect) = self.overlay.finish() else {
            return;
        };
        self.animator.stop();

        let component = if rect.is_empty() {
            ctx.layers.hit_test(event.position)
        } else {
            None
        };

        match component {
            Some(component) if event.modifiers.shift => {
                tracing::debug!(%component, "toggling component");
                self.bus.emit(CanvasEvent::ToggleOne(component));
            }
            Some(component) => {
                tracing::debug!(%component, "selecting component");
                self.deselect_all_and_wait();
                self.bus.emit(CanvasEvent::SelectOne {
                    source: *event,
                    component,
                });
            }
            None => {
                tracing::debug!(x = rect.x, y = rect.y, width = rect.width, height = rect.height, "selecting area");
                self.deselect_all_and_wait();
                self.bus.emit(CanvasEvent::SelectArea(rect));
            }
        }
        ctx.host.request_repaint();
    }
}

impl InputHandler for SelectingHandler {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Selecting
    }

    fn stop(&mut self) {
        if self.overlay.is_selecting() {
            tracing::debug!("selection gesture abandoned");
            self.overlay.cancel();
        }
        self.animator.stop();
    }

    fn handle_pointer(&mut self, event: &PointerEvent, ctx: &mut HandlerContext<'_>) {
        match event.action {
            PointerAction::Pressed if event.is_primary() => {
                self.overlay.begin(event.position);
                self.animator.start();
                self.bus.emit(CanvasEvent::DeselectAll);
                ctx.host.request_repaint();
            }
            PointerAction::Dragged if self.overlay.is_selecting() => {
                self.overlay.update(event.position);
                ctx.host.request_repaint();
            }
            PointerAction::Released if event.is_primary() => {
                self.finish(event, ctx);
            }
            _ => {}
        }
    }
}
