//! Fixed-rate periodic task scheduling on a background thread.
//!
//! [`TaskScheduler`] owns one thread that sleeps until the next due task,
//! runs it, and re-arms it one period later. [`ScheduledTaskManager`] layers
//! keyed deduplication on top so one logical animation never gets two timers.
//!
//! Cancelling a [`PeriodicHandle`] stops future ticks; a tick that is already
//! running finishes normally.

use crate::domain::error::{ProbeMapError, Result};
use crossbeam_channel::{RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

const MIN_PERIOD: Duration = Duration::from_millis(1);

type Task = Box<dyn FnMut() + Send + 'static>;

/// Handle to one scheduled periodic task.
#[derive(Debug, Clone)]
pub struct PeriodicHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl PeriodicHandle {
    fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Stops future ticks. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl PartialEq for PeriodicHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PeriodicHandle {}

struct Entry {
    handle: PeriodicHandle,
    task: Task,
    due: Instant,
    period: Duration,
}

/// Single-threaded background scheduler.
#[derive(Debug)]
pub struct TaskScheduler {
    commands: Sender<Entry>,
    next_id: AtomicU64,
}

impl TaskScheduler {
    /// Spawns the scheduler thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn new(name: &str) -> Result<Self> {
        let (commands, receiver) = crossbeam_channel::unbounded::<Entry>();

        std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut entries: Vec<Entry> = Vec::new();
                loop {
                    entries.retain(|entry| !entry.handle.is_cancelled());

                    let next_due = entries.iter().map(|entry| entry.due).min();
                    let received = match next_due {
                        Some(due) => receiver.recv_deadline(due),
                        None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
                    };

                    match received {
                        Ok(entry) => entries.push(entry),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }

                    run_due(&mut entries);
                }
                tracing::debug!(pending = entries.len(), "scheduler thread exiting");
            })?;

        Ok(Self {
            commands,
            next_id: AtomicU64::new(1),
        })
    }

    /// Runs `task` after `initial_delay`, then every `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler thread is gone.
    pub fn schedule_at_fixed_rate(
        &self,
        task: impl FnMut() + Send + 'static,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<PeriodicHandle> {
        let period = if period < MIN_PERIOD {
            tracing::warn!(?period, "period below one millisecond, raising");
            MIN_PERIOD
        } else {
            period
        };

        let handle = PeriodicHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Entry {
            handle: handle.clone(),
            task: Box::new(task),
            due: Instant::now() + initial_delay,
            period,
        };

        self.commands
            .send(entry)
            .map_err(|_| ProbeMapError::Scheduler("scheduler thread stopped".to_string()))?;

        tracing::trace!(id = handle.id, ?initial_delay, ?period, "periodic task scheduled");
        Ok(handle)
    }
}

fn run_due(entries: &mut [Entry]) {
    let now = Instant::now();
    for entry in entries.iter_mut() {
        if entry.due > now || entry.handle.is_cancelled() {
            continue;
        }

        if catch_unwind(AssertUnwindSafe(&mut entry.task)).is_err() {
            tracing::error!(id = entry.handle.id, "periodic task panicked, cancelling");
            entry.handle.cancel();
            continue;
        }

        entry.due += entry.period;
        if entry.due <= now {
            // fell more than a period behind; realign instead of bursting
            entry.due = now + entry.period;
        }
    }
}

/// Keyed periodic-task registry driving canvas animations.
///
/// # Example
///
/// ```
/// use probemap::animation::ScheduledTaskManager;
/// use std::time::Duration;
///
/// let manager = ScheduledTaskManager::new()?;
/// let first = manager.start_periodic("blink", || {}, Duration::ZERO, Duration::from_millis(50));
/// let second = manager.start_periodic("blink", || {}, Duration::ZERO, Duration::from_millis(50));
/// assert_eq!(first, second);
///
/// manager.stop_periodic(&first);
/// manager.stop_periodic(&first);
/// assert!(!manager.is_active("blink"));
/// # Ok::<(), probemap::ProbeMapError>(())
/// ```
#[derive(Debug)]
pub struct ScheduledTaskManager {
    scheduler: TaskScheduler,
    active: Mutex<HashMap<String, PeriodicHandle>>,
}

impl ScheduledTaskManager {
    /// Creates a manager with its own scheduler thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler thread cannot be spawned.
    pub fn new() -> Result<Self> {
        Ok(Self {
            scheduler: TaskScheduler::new("probemap-scheduler")?,
            active: Mutex::new(HashMap::new()),
        })
    }

    /// Starts `task` under `key` unless that key already has a live handle,
    /// in which case the existing handle is returned and `task` is dropped.
    ///
    /// If the scheduler is unavailable the failure is logged and an already
    /// cancelled handle is returned.
    pub fn start_periodic(
        &self,
        key: &str,
        task: impl FnMut() + Send + 'static,
        initial_delay: Duration,
        period: Duration,
    ) -> PeriodicHandle {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = active.get(key) {
            if !existing.is_cancelled() {
                tracing::trace!(key, id = existing.id, "periodic task already running");
                return existing.clone();
            }
        }

        match self
            .scheduler
            .schedule_at_fixed_rate(task, initial_delay, period)
        {
            Ok(handle) => {
                tracing::debug!(key, id = handle.id, "periodic task started");
                active.insert(key.to_string(), handle.clone());
                handle
            }
            Err(e) => {
                tracing::error!(key, error = %e, "failed to start periodic task");
                let handle = PeriodicHandle::new(0);
                handle.cancel();
                handle
            }
        }
    }

    /// Cancels `handle`. Safe to call repeatedly or on finished handles.
    pub fn stop_periodic(&self, handle: &PeriodicHandle) {
        handle.cancel();
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.retain(|_, registered| registered != handle);
        tracing::trace!(id = handle.id, "periodic task stopped");
    }

    /// True when `key` has a live periodic task.
    #[must_use]
    pub fn is_active(&self, key: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .is_some_and(|handle| !handle.is_cancelled())
    }
}

impl Drop for ScheduledTaskManager {
    fn drop(&mut self) {
        let active = self.active.get_mut().unwrap_or_else(PoisonError::into_inner);
        for handle in active.values() {
            handle.cancel();
        }
        active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::clone(&count);
        (count, move || {
            ticks.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn task_ticks_repeatedly_until_stopped() {
        let manager = ScheduledTaskManager::new().unwrap();
        let (count, task) = counter();

        let handle = manager.start_periodic("tick", task, Duration::ZERO, Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(80));
        manager.stop_periodic(&handle);

        // allow a tick in flight to land, then ensure the count is frozen
        std::thread::sleep(Duration::from_millis(20));
        let frozen = count.load(Ordering::SeqCst);
        assert!(frozen >= 2, "expected several ticks, got {frozen}");

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(count.load(Ordering::SeqCst), frozen);
    }

    #[test]
    fn second_start_returns_existing_handle_without_a_second_timer() {
        let manager = ScheduledTaskManager::new().unwrap();
        let (first_count, first_task) = counter();
        let (second_count, second_task) = counter();

        let first = manager.start_periodic("ants", first_task, Duration::ZERO, Duration::from_millis(5));
        let second = manager.start_periodic("ants", second_task, Duration::ZERO, Duration::from_millis(5));
        assert_eq!(first, second);

        std::thread::sleep(Duration::from_millis(40));
        manager.stop_periodic(&first);

        assert!(first_count.load(Ordering::SeqCst) > 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stop_is_idempotent_and_allows_restart() {
        let manager = ScheduledTaskManager::new().unwrap();
        let handle = manager.start_periodic("ants", || {}, Duration::from_secs(60), Duration::from_secs(60));
        assert!(manager.is_active("ants"));

        manager.stop_periodic(&handle);
        manager.stop_periodic(&handle);
        assert!(handle.is_cancelled());
        assert!(!manager.is_active("ants"));

        let restarted = manager.start_periodic("ants", || {}, Duration::from_secs(60), Duration::from_secs(60));
        assert_ne!(restarted, handle);
        manager.stop_periodic(&restarted);
    }

    #[test]
    fn initial_delay_postpones_first_tick() {
        let manager = ScheduledTaskManager::new().unwrap();
        let (count, task) = counter();

        let handle = manager.start_periodic("late", task, Duration::from_secs(60), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        manager.stop_periodic(&handle);
    }

    #[test]
    fn zero_period_is_raised_to_minimum() {
        let scheduler = TaskScheduler::new("zero-period").unwrap();
        let (count, task) = counter();
        let handle = scheduler
            .schedule_at_fixed_rate(task, Duration::ZERO, Duration::ZERO)
            .unwrap();
        std::thread::sleep(Duration::from_millis(20));
        handle.cancel();
        assert!(count.load(Ordering::SeqCst) >= 1);
    }
}
