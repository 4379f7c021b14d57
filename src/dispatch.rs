//! Hand-off between the caller's thread and a background worker.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::error;

/// Unit of work handed to a [`Dispatcher`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs off the caller's thread and posts completions back to it.
pub trait Dispatcher: Send + Sync {
  /// Run `job` on a background worker.
  fn background(&self, job: Job);

  /// Queue `job` for the foreground (caller's) execution context.
  fn foreground(&self, job: Job);
}

/// [`Dispatcher`] using one thread per background job and a channel for the foreground.
///
/// Foreground jobs only run when the owner pumps them with [`ThreadDispatcher::run_pending`]
/// or [`ThreadDispatcher::run_next_timeout`], typically from its event loop.
pub struct ThreadDispatcher {
  sender: flume::Sender<Job>,
  receiver: flume::Receiver<Job>,
}

impl ThreadDispatcher {
  /// Create a dispatcher with an empty foreground queue.
  pub fn new() -> Self {
    let (sender, receiver) = flume::unbounded();
    Self { sender, receiver }
  }

  /// Run every foreground job queued so far; returns how many ran.
  pub fn run_pending(&self) -> usize {
    let mut ran = 0;
    while let Ok(job) = self.receiver.try_recv() {
      job();
      ran += 1;
    }
    ran
  }

  /// Wait up to `timeout` for one foreground job and run it.
  pub fn run_next_timeout(&self, timeout: Duration) -> bool {
    match self.receiver.recv_timeout(timeout) {
      Ok(job) => {
        job();
        true
      }
      Err(flume::RecvTimeoutError::Timeout) | Err(flume::RecvTimeoutError::Disconnected) => false,
    }
  }
}

impl Default for ThreadDispatcher {
  fn default() -> Self {
    Self::new()
  }
}

impl Dispatcher for ThreadDispatcher {
  fn background(&self, job: Job) {
    let slot = Arc::new(Mutex::new(Some(job)));
    let worker_slot = Arc::clone(&slot);

    let spawned = thread::Builder::new()
      .name("asset-sync-worker".into())
      .spawn(move || {
        if let Some(job) = take_job(&worker_slot) {
          job();
        }
      });

    if let Err(err) = spawned {
      error!(%err, "failed to spawn sync worker, running job inline");
      if let Some(job) = take_job(&slot) {
        job();
      }
    }
  }

  fn foreground(&self, job: Job) {
    if let Err(err) = self.sender.send(job) {
      error!(%err, "failed to queue foreground job");
    }
  }
}

fn take_job(slot: &Mutex<Option<Job>>) -> Option<Job> {
  slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}
