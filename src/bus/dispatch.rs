//! Shared dispatch facility executing event-bus deliveries off the caller's thread.
//!
//! A [`Dispatcher`] is a fixed pool of named worker threads pulling boxed jobs
//! from one `crossbeam-channel` queue. With a single worker (the default) jobs
//! run strictly in submission order. Workers exit once every handle to the
//! dispatcher is dropped and the queue drains.

use crate::domain::error::{ProbeMapError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Counts queued and running jobs so callers can wait for quiescence.
#[derive(Debug, Default)]
struct IdleTracker {
    pending: Mutex<usize>,
    idle: Condvar,
}

impl IdleTracker {
    fn begin(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending += 1;
    }

    fn finish(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while *pending > 0 {
            pending = self
                .idle
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Thread pool that runs event deliveries.
///
/// Cloning a `Dispatcher` shares the same queue and workers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    sender: Sender<Job>,
    tracker: Arc<IdleTracker>,
    workers: usize,
}

impl Dispatcher {
    /// Spawns `workers` threads named `<name>-<index>`.
    ///
    /// A worker count of zero is raised to one.
    ///
    /// # Errors
    ///
    /// Returns an error if the operating system refuses to spawn a thread.
    pub fn new(name: &str, workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let tracker = Arc::new(IdleTracker::default());

        for index in 0..workers {
            let receiver = receiver.clone();
            let tracker = Arc::clone(&tracker);
            std::thread::Builder::new()
                .name(format!("{name}-{index}"))
                .spawn(move || run_worker(&receiver, &tracker))?;
        }

        tracing::debug!(name, workers, "dispatcher started");
        Ok(Self {
            sender,
            tracker,
            workers,
        })
    }

    /// Number of worker threads serving this dispatcher.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Queues a job. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeMapError::Dispatch`] if every worker has exited. The job
    /// is dropped unrun and does not count towards [`Dispatcher::wait_idle`].
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<()> {
        self.tracker.begin();
        self.sender.send(Box::new(job)).map_err(|_| {
            self.tracker.finish();
            ProbeMapError::Dispatch("dispatch queue closed".to_string())
        })
    }

    /// Blocks until every job submitted so far has finished running.
    ///
    /// Must not be called from a dispatched job.
    pub fn wait_idle(&self) {
        self.tracker.wait_idle();
    }
}

fn run_worker(receiver: &Receiver<Job>, tracker: &IdleTracker) {
    for job in receiver.iter() {
        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!("dispatch job panicked");
        }
        tracker.finish();
    }
    tracing::trace!("dispatch worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn single_worker_runs_jobs_in_submission_order() {
        let dispatcher = Dispatcher::new("test-dispatch", 1).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..20 {
            let seen = Arc::clone(&seen);
            dispatcher.submit(move || seen.lock().unwrap().push(i)).unwrap();
        }
        dispatcher.wait_idle();

        assert_eq!(*seen.lock().unwrap(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn panicking_job_does_not_stall_the_pool() {
        let dispatcher = Dispatcher::new("test-dispatch", 2).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));

        dispatcher.submit(|| panic!("listener blew up")).unwrap();
        for _ in 0..4 {
            let ran = Arc::clone(&ran);
            dispatcher
                .submit(move || {
                    ran.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }
        dispatcher.wait_idle();

        assert_eq!(ran.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn closed_queue_rejects_jobs_without_stalling_wait_idle() {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        drop(receiver);
        let dispatcher = Dispatcher {
            sender,
            tracker: Arc::new(IdleTracker::default()),
            workers: 0,
        };

        let err = dispatcher.submit(|| {}).unwrap_err();
        assert!(matches!(err, ProbeMapError::Dispatch(_)));
        dispatcher.wait_idle();
    }

    #[test]
    fn zero_workers_is_raised_to_one() {
        let dispatcher = Dispatcher::new("test-dispatch", 0).unwrap();
        assert_eq!(dispatcher.workers(), 1);
    }
}
