//! Canvas event vocabulary carried by the [`CanvasBus`].
//!
//! Every published payload is a variant of the [`CanvasEvent`] sum type, and
//! the bus is keyed by the matching [`EventKind`]. Listeners match on the
//! variant they subscribed for instead of downcasting.

use super::event_bus::{Awaiter, EventBus, Listener};
use crate::domain::{ComponentId, PointerEvent, Rect};
use crate::layers::Layer;

/// Discriminant of [`CanvasEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    LayerAdded,
    SelectOne,
    DeselectOne,
    ToggleOne,
    DeselectAll,
    SelectArea,
    SelectionStrokeChanged,
    ViewChanged,
}

impl EventKind {
    pub const ALL: [Self; 8] = [
        Self::LayerAdded,
        Self::SelectOne,
        Self::DeselectOne,
        Self::ToggleOne,
        Self::DeselectAll,
        Self::SelectArea,
        Self::SelectionStrokeChanged,
        Self::ViewChanged,
    ];
}

/// Payload published on the canvas bus.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// A layer joined (or replaced an entry in) the layer stack.
    LayerAdded(Layer),

    /// A single component was clicked in selecting mode.
    SelectOne {
        /// The release event that completed the click.
        source: PointerEvent,
        component: ComponentId,
    },

    /// A tool panel asked to drop one component from the selection.
    DeselectOne(ComponentId),

    /// A component was shift-clicked and should flip its selection state.
    ToggleOne(ComponentId),

    /// All selection state must be cleared.
    DeselectAll,

    /// An area gesture finished with this normalized rectangle.
    SelectArea(Rect),

    /// The marching-ants animation moved to the next dash pattern.
    SelectionStrokeChanged { old: usize, new: usize },

    /// The map view was panned or zoomed.
    ViewChanged { offset: (f64, f64), zoom: u8 },
}

impl CanvasEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::LayerAdded(_) => EventKind::LayerAdded,
            Self::SelectOne { .. } => EventKind::SelectOne,
            Self::DeselectOne(_) => EventKind::DeselectOne,
            Self::ToggleOne(_) => EventKind::ToggleOne,
            Self::DeselectAll => EventKind::DeselectAll,
            Self::SelectArea(_) => EventKind::SelectArea,
            Self::SelectionStrokeChanged { .. } => EventKind::SelectionStrokeChanged,
            Self::ViewChanged { .. } => EventKind::ViewChanged,
        }
    }
}

/// The bus connecting controllers, overlays and tool panels.
pub type CanvasBus = EventBus<EventKind, CanvasEvent>;

/// Listener type for the canvas bus.
pub type CanvasListener = Listener<CanvasEvent>;

/// Publishing helpers that derive the kind from the payload.
pub trait CanvasBusExt {
    /// Publishes `event` under its own kind.
    fn emit(&self, event: CanvasEvent);

    /// Publishes `event` under its own kind and returns a delivery handle.
    fn emit_and_await(&self, event: CanvasEvent) -> Awaiter;
}

impl CanvasBusExt for CanvasBus {
    fn emit(&self, event: CanvasEvent) {
        self.publish(event.kind(), event);
    }

    fn emit_and_await(&self, event: CanvasEvent) -> Awaiter {
        self.publish_and_await(event.kind(), event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Dispatcher;
    use std::sync::{Arc, Mutex};

    #[test]
    fn emit_routes_by_payload_kind() {
        let bus = CanvasBus::new(Dispatcher::new("events-test", 1).unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener = CanvasListener::new(move |event: &CanvasEvent| {
            sink.lock().unwrap().push(event.clone());
        });

        bus.subscribe(EventKind::SelectArea, &listener);
        bus.emit(CanvasEvent::DeselectAll);
        bus.emit_and_await(CanvasEvent::SelectArea(Rect::new(1, 2, 3, 4)))
            .wait();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![CanvasEvent::SelectArea(Rect::new(1, 2, 3, 4))]
        );
    }

    #[test]
    fn every_kind_is_listed_once() {
        let mut kinds = EventKind::ALL.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), EventKind::ALL.len());
    }
}
