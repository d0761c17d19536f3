//! Marching-ants animation for the selection rectangle border.
//!
//! The border alternates between a small fixed palette of dash patterns.
//! Each tick advances the phase cyclically and publishes
//! `SelectionStrokeChanged { old, new }` so overlays repaint without polling.

use super::scheduler::{PeriodicHandle, ScheduledTaskManager};
use crate::bus::{CanvasBus, CanvasBusExt, CanvasEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Scheduler key shared by every start of the selection stroke animation.
pub const STROKE_TASK_KEY: &str = "selection-stroke";

/// A dash pattern: alternating on/off lengths in pixels plus a phase offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePattern {
    pub dashes: [f32; 2],
    pub offset: f32,
}

/// The stroke palette cycled by the animation.
pub const STROKE_PALETTE: [StrokePattern; 2] = [
    StrokePattern {
        dashes: [4.0, 4.0],
        offset: 0.0,
    },
    StrokePattern {
        dashes: [4.0, 4.0],
        offset: 4.0,
    },
];

/// Returns the pattern for `phase`, wrapping out-of-range values.
#[must_use]
pub const fn stroke_for_phase(phase: usize) -> StrokePattern {
    STROKE_PALETTE[phase % STROKE_PALETTE.len()]
}

/// Drives the stroke phase through the [`ScheduledTaskManager`].
#[derive(Debug)]
pub struct StrokeAnimator {
    manager: Arc<ScheduledTaskManager>,
    bus: CanvasBus,
    phase: Arc<AtomicUsize>,
    handle: Mutex<Option<PeriodicHandle>>,
    initial_delay: Duration,
    period: Duration,
}

impl StrokeAnimator {
    #[must_use]
    pub fn new(
        manager: Arc<ScheduledTaskManager>,
        bus: CanvasBus,
        initial_delay: Duration,
        period: Duration,
    ) -> Self {
        Self {
            manager,
            bus,
            phase: Arc::new(AtomicUsize::new(0)),
            handle: Mutex::new(None),
            initial_delay,
            period,
        }
    }

    /// Current phase index into [`STROKE_PALETTE`].
    #[must_use]
    pub fn phase(&self) -> usize {
        self.phase.load(Ordering::SeqCst)
    }

    /// Starts ticking. Calling it while already running keeps the running timer.
    pub fn start(&self) {
        let phase = Arc::clone(&self.phase);
        let bus = self.bus.clone();
        let task = move || {
            let palette = STROKE_PALETTE.len();
            let old = phase
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                    Some((current + 1) % palette)
                })
                .unwrap_or_default();
            let new = (old + 1) % palette;
            bus.emit(CanvasEvent::SelectionStrokeChanged { old, new });
        };

        let handle = self
            .manager
            .start_periodic(STROKE_TASK_KEY, task, self.initial_delay, self.period);
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Stops ticking. No-op when not running.
    pub fn stop(&self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            self.manager.stop_periodic(&handle);
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.manager.is_active(STROKE_TASK_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{CanvasListener, Dispatcher, EventKind};

    #[test]
    fn ticks_cycle_through_palette_and_publish_transitions() {
        let bus = CanvasBus::new(Dispatcher::new("stroke-test", 1).unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener = CanvasListener::new(move |event| {
            if let CanvasEvent::SelectionStrokeChanged { old, new } = event {
                sink.lock().unwrap().push((*old, *new));
            }
        });
        bus.subscribe(EventKind::SelectionStrokeChanged, &listener);

        let manager = Arc::new(ScheduledTaskManager::new().unwrap());
        let animator = StrokeAnimator::new(manager, bus.clone(), Duration::ZERO, Duration::from_millis(5));

        animator.start();
        animator.start();
        assert!(animator.is_running());
        std::thread::sleep(Duration::from_millis(60));
        animator.stop();
        animator.stop();
        assert!(!animator.is_running());

        std::thread::sleep(Duration::from_millis(20));
        bus.wait_idle();

        let seen = seen.lock().unwrap();
        assert!(seen.len() >= 2);
        assert_eq!(seen[0], (0, 1));
        assert_eq!(seen[1], (1, 0));
        assert!(seen.windows(2).all(|pair| pair[0].1 == pair[1].0));
    }

    #[test]
    fn phase_lookup_wraps() {
        assert_eq!(stroke_for_phase(0), STROKE_PALETTE[0]);
        assert_eq!(stroke_for_phase(3), STROKE_PALETTE[1]);
    }
}
