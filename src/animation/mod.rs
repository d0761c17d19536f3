//! Periodic animation drivers.
//!
//! - [`scheduler`]: Background fixed-rate scheduling with keyed deduplication
//! - [`stroke`]: The selection border's marching-ants phase

pub mod scheduler;
pub mod stroke;

pub use scheduler::{PeriodicHandle, ScheduledTaskManager, TaskScheduler};
pub use stroke::{stroke_for_phase, StrokeAnimator, StrokePattern, STROKE_PALETTE, STROKE_TASK_KEY};
