//! Deferred resolution tasks keyed by round id

use crate::types::RoundId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// One sleeping task per pending round
#[derive(Default)]
pub struct RoundScheduler {
    tasks: Mutex<HashMap<RoundId, JoinHandle<()>>>,
}

impl RoundScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` after `delay`, replacing any task already keyed by `id`
    pub fn schedule<F>(&self, id: RoundId, delay: Duration, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Lock held across spawn so `complete` from the job cannot run first
        let mut tasks = self.tasks.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
        });
        if let Some(previous) = tasks.insert(id, handle) {
            previous.abort();
        }
    }

    /// Drop the bookkeeping for a task that has fired
    pub fn complete(&self, id: &RoundId) {
        self.tasks.lock().remove(id);
    }

    /// Abort a pending task. Returns false if nothing was pending.
    pub fn cancel(&self, id: &RoundId) -> bool {
        match self.tasks.lock().remove(id) {
            Some(handle) => {
                handle.abort();
                debug!("Cancelled resolution task for round {}", id);
                true
            }
            None => false,
        }
    }

    /// Abort everything; returns how many tasks were pending
    pub fn cancel_all(&self) -> usize {
        let mut tasks = self.tasks.lock();
        let count = tasks.len();
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    #[cfg(test)]
    pub fn is_scheduled(&self, id: &RoundId) -> bool {
        self.tasks.lock().contains_key(id)
    }
}
