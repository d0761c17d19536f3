//! Drag-to-pan and wheel/double-click zoom.

use super::handler::{HandlerContext, InputHandler};
use super::modes::ControllerKind;
use crate::bus::{CanvasBus, CanvasBusExt, CanvasEvent};
use crate::domain::{Point, PointerAction, PointerEvent};

/// Moves and zooms the map view.
#[derive(Debug)]
pub struct PanningHandler {
    bus: CanvasBus,
    last_drag: Option<Point>,
}

impl PanningHandler {
    #[must_use]
    pub const fn new(bus: CanvasBus) -> Self {
        Self {
            bus,
            last_drag: None,
        }
    }

    fn view_changed(&self, ctx: &HandlerContext<'_>) {
        let view = ctx.layers.view();
        self.bus.emit(CanvasEvent::ViewChanged {
            offset: view.offset(),
            zoom: view.zoom(),
        });
        ctx.host.request_repaint();
    }

    fn zoom(&self, anchor: Point, steps: i32, ctx: &mut HandlerContext<'_>) {
        if ctx.layers.view_mut().zoom_at(anchor, steps) {
            tracing::debug!(x = anchor.x, y = anchor.y, steps, zoom = ctx.layers.view().zoom(), "zoomed");
            self.view_changed(ctx);
        }
    }
}

impl InputHandler for PanningHandler {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Panning
    }

    fn stop(&mut self) {
        self.last_drag = None;
    }

    fn handle_pointer(&mut self, event: &PointerEvent, ctx: &mut HandlerContext<'_>) {
        match event.action {
            PointerAction::Pressed if event.is_primary() => {
                self.last_drag = Some(event.position);
            }
            PointerAction::Dragged => {
                let Some(last) = self.last_drag else {
                    return;
                };
                let (dx, dy) = event.position.delta_from(last);
                self.last_drag = Some(event.position);
                if dx == 0 && dy == 0 {
                    return;
                }
                ctx.layers.view_mut().pan_by(dx, dy);
                tracing::trace!(dx, dy, "panned");
                self.view_changed(ctx);
            }
            PointerAction::Released if event.is_primary() => {
                self.last_drag = None;
            }
            PointerAction::Wheel { rotation } if rotation != 0 => {
                self.zoom(event.position, rotation.saturating_neg(), ctx);
            }
            PointerAction::Clicked if event.is_primary() && event.click_count == 2 => {
                self.zoom(event.position, 1, ctx);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CanvasHost;
    use crate::bus::Dispatcher;
    use crate::domain::MouseButton;
    use crate::layers::{LayerStack, MAX_ZOOM, MIN_ZOOM};

    #[derive(Debug)]
    struct NullHost;

    impl CanvasHost for NullHost {
        fn request_repaint(&self) {}
    }

    fn pointer(action: PointerAction, x: i32, y: i32) -> PointerEvent {
        PointerEvent::new(action, Point::new(x, y), Some(MouseButton::Primary))
    }

    fn handler() -> PanningHandler {
        PanningHandler::new(CanvasBus::new(Dispatcher::new("pan-test", 1).unwrap()))
    }

    #[test]
    fn drag_pans_by_incremental_deltas() {
        let mut handler = handler();
        let mut layers = LayerStack::detached();
        let host = NullHost;
        let mut ctx = HandlerContext::new(&mut layers, &host);

        handler.handle_pointer(&pointer(PointerAction::Pressed, 5, 5), &mut ctx);
        handler.handle_pointer(&pointer(PointerAction::Dragged, 8, 7), &mut ctx);
        handler.handle_pointer(&pointer(PointerAction::Dragged, 15, 1), &mut ctx);
        handler.handle_pointer(&pointer(PointerAction::Released, 15, 1), &mut ctx);
        handler.handle_pointer(&pointer(PointerAction::Dragged, 40, 40), &mut ctx);

        assert_eq!(layers.view().offset(), (10.0, -4.0));
    }

    #[test]
    fn wheel_and_double_click_zoom_at_pointer() {
        let mut handler = handler();
        let mut layers = LayerStack::detached();
        layers.view_mut().zoom_at(Point::new(0, 0), 4);
        let host = NullHost;
        let mut ctx = HandlerContext::new(&mut layers, &host);

        handler.handle_pointer(&pointer(PointerAction::Wheel { rotation: 1 }, 0, 0), &mut ctx);
        assert_eq!(ctx.layers.view().zoom(), 3);

        handler.handle_pointer(&pointer(PointerAction::Clicked, 0, 0).with_click_count(2), &mut ctx);
        handler.handle_pointer(&pointer(PointerAction::Clicked, 0, 0), &mut ctx);
        assert_eq!(ctx.layers.view().zoom(), 4);
    }

    #[test]
    fn extreme_wheel_rotation_clamps_zoom() {
        let mut handler = handler();
        let mut layers = LayerStack::detached();
        layers.view_mut().zoom_at(Point::new(0, 0), 3);
        let host = NullHost;
        let mut ctx = HandlerContext::new(&mut layers, &host);

        let rotation = -i32::MAX;
        handler.handle_pointer(&pointer(PointerAction::Wheel { rotation }, 0, 0), &mut ctx);
        assert_eq!(ctx.layers.view().zoom(), MAX_ZOOM);

        let rotation = i32::MAX;
        handler.handle_pointer(&pointer(PointerAction::Wheel { rotation }, 0, 0), &mut ctx);
        assert_eq!(ctx.layers.view().zoom(), MIN_ZOOM);

        let rotation = i32::MIN;
        handler.handle_pointer(&pointer(PointerAction::Wheel { rotation }, 0, 0), &mut ctx);
        assert_eq!(ctx.layers.view().zoom(), MAX_ZOOM);
    }

    #[test]
    fn stop_forgets_drag_anchor() {
        let mut handler = handler();
        let mut layers = LayerStack::detached();
        let host = NullHost;
        let mut ctx = HandlerContext::new(&mut layers, &host);

        handler.handle_pointer(&pointer(PointerAction::Pressed, 0, 0), &mut ctx);
        handler.stop();
        handler.handle_pointer(&pointer(PointerAction::Dragged, 30, 30), &mut ctx);

        assert_eq!(ctx.layers.view().offset(), (0.0, 0.0));
    }
}
