//! Single-consumer FIFO worker.
//!
//! A [`QueueWorker`] owns one background thread that executes submitted jobs
//! strictly in submission order, one at a time. Submitting never blocks the
//! caller; [`QueueWorker::shutdown()`] is the only blocking operation and
//! returns once every job submitted before it has finished.
//!
//! There is no cancellation: once a job is accepted by
//! [`submit()`](QueueWorker::submit) it will run. A job that panics is caught
//! and logged, and the worker moves on to the next one.
//!
//! ```
//! use dltrack_queue::QueueWorker;
//! use std::sync::{Arc, Mutex};
//!
//! # fn main() -> dltrack_queue::error::Result<()> {
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let mut worker = QueueWorker::new("example");
//! worker.start()?;
//! for n in 0..3 {
//!     let seen = Arc::clone(&seen);
//!     worker.submit(move || seen.lock().unwrap().push(n))?;
//! }
//! worker.shutdown()?;
//! assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
//! # Ok(())
//! # }
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{Builder, JoinHandle};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Background worker executing deferred jobs in FIFO order.
pub struct QueueWorker {
    /// Used for the thread name and in log events.
    name: String,
    sender: Option<UnboundedSender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl QueueWorker {
    /// Create a worker that is not yet running. Call
    /// [`start()`](Self::start) before submitting jobs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sender: None,
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` between a successful [`start()`](Self::start) and the
    /// next [`shutdown()`](Self::shutdown).
    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }

    /// Spawn the worker thread. Starting an already running worker is a
    /// no-op, and a worker that has been shut down may be started again.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let (sender, receiver) = unbounded_channel::<Job>();
        let name = self.name.clone();
        let handle = Builder::new()
            .name(format!("queue-{}", self.name))
            .spawn(move || run(&name, receiver))
            .or_raise(|| ErrorKind::Spawn(self.name.clone()))?;
        self.sender = Some(sender);
        self.handle = Some(handle);
        Ok(())
    }

    /// Enqueue a job and return immediately.
    ///
    /// # Errors
    /// Returns [`ErrorKind::NotRunning`] if the worker was never started or
    /// has already been shut down. The job is dropped without running.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or_raise(|| ErrorKind::NotRunning(self.name.clone()))?;
        sender.send(Box::new(job)).map_err(|_| ErrorKind::NotRunning(self.name.clone()))?;
        Ok(())
    }

    /// Stop accepting jobs, wait for everything already queued to finish, then
    /// join the worker thread. Calling this more than once is fine.
    pub fn shutdown(&mut self) -> Result<()> {
        // Dropping the only sender closes the channel; the worker keeps
        // receiving until the buffer is empty and then exits its loop.
        drop(self.sender.take());
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            exn::bail!(ErrorKind::Panicked(self.name.clone()));
        }
        Ok(())
    }
}

impl Drop for QueueWorker {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::error!(queue = %self.name, error = ?err, "Queue worker did not shut down cleanly");
        }
    }
}

fn run(name: &str, mut receiver: UnboundedReceiver<Job>) {
    tracing::debug!(queue = name, "Queue worker started");
    while let Some(job) = receiver.blocking_recv() {
        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!(queue = name, "Queued job panicked; continuing with the next job");
        }
    }
    tracing::debug!(queue = name, "Queue drained; worker stopped");
}
