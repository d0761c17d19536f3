//! Ephemeral selection rectangle handed to the renderer.
//!
//! The selecting handler writes the gesture's corners from the UI thread while
//! stroke-phase updates arrive from dispatch threads, so the geometry sits
//! behind a mutex and the phase in an atomic.

use crate::animation::{stroke_for_phase, StrokePattern};
use crate::app::CanvasHost;
use crate::bus::{CanvasBus, CanvasEvent, CanvasListener, EventKind};
use crate::domain::{Point, Rect};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default, Clone, Copy)]
struct Gesture {
    start: Point,
    end: Point,
    selecting: bool,
}

/// Rendering data for the live selection rectangle.
#[derive(Debug)]
pub struct SelectionOverlay {
    gesture: Mutex<Gesture>,
    stroke_phase: AtomicUsize,
    listener: Mutex<Option<CanvasListener>>,
    host: Arc<dyn CanvasHost>,
}

impl SelectionOverlay {
    #[must_use]
    pub fn new(host: Arc<dyn CanvasHost>) -> Arc<Self> {
        Arc::new(Self {
            gesture: Mutex::new(Gesture::default()),
            stroke_phase: AtomicUsize::new(0),
            listener: Mutex::new(None),
            host,
        })
    }

    fn gesture(&self) -> MutexGuard<'_, Gesture> {
        self.gesture.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribes to stroke-phase changes on `bus`. Attaching twice is a no-op.
    pub fn attach(self: &Arc<Self>, bus: &CanvasBus) {
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return;
        }

        let weak = Arc::downgrade(self);
        let listener = CanvasListener::new(move |event| {
            let (Some(overlay), CanvasEvent::SelectionStrokeChanged { new, .. }) =
                (weak.upgrade(), event)
            else {
                return;
            };
            overlay.stroke_phase.store(*new, Ordering::SeqCst);
            if overlay.is_selecting() {
                overlay.host.request_repaint();
            }
        });

        bus.subscribe(EventKind::SelectionStrokeChanged, &listener);
        *slot = Some(listener);
    }

    /// Removes the stroke subscription installed by [`SelectionOverlay::attach`].
    pub fn detach(&self, bus: &CanvasBus) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            bus.unsubscribe(&listener);
        }
    }

    /// Starts a new gesture at `point`, discarding any previous extents.
    pub fn begin(&self, point: Point) {
        *self.gesture() = Gesture {
            start: point,
            end: point,
            selecting: true,
        };
    }

    /// Moves the free corner of the active gesture. Ignored when idle.
    pub fn update(&self, point: Point) {
        let mut gesture = self.gesture();
        if gesture.selecting {
            gesture.end = point;
        }
    }

    /// Ends the active gesture and returns its normalized rectangle.
    pub fn finish(&self) -> Option<Rect> {
        let mut gesture = self.gesture();
        if !gesture.selecting {
            return None;
        }
        gesture.selecting = false;
        Some(Rect::from_corners(gesture.start, gesture.end))
    }

    /// Abandons the active gesture without producing a rectangle.
    pub fn cancel(&self) {
        self.gesture().selecting = false;
    }

    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.gesture().selecting
    }

    #[must_use]
    pub fn start(&self) -> Point {
        self.gesture().start
    }

    #[must_use]
    pub fn end(&self) -> Point {
        self.gesture().end
    }

    /// The normalized rectangle between the current start and end points.
    #[must_use]
    pub fn rect(&self) -> Rect {
        let gesture = self.gesture();
        Rect::from_corners(gesture.start, gesture.end)
    }

    #[must_use]
    pub fn stroke_phase(&self) -> usize {
        self.stroke_phase.load(Ordering::SeqCst)
    }

    /// Dash pattern to use on the next repaint.
    #[must_use]
    pub fn stroke(&self) -> StrokePattern {
        stroke_for_phase(self.stroke_phase())
    }
}
