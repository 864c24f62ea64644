//! Process registry implementation.
//!
//! Owns the tick loop of every live process. The id → task map is the only
//! shared mutable state in the service.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use crate::scheduler::{ScheduledTask, Scheduler, TaskHandle};

use super::RegistryError;

/// Handle to the process registry.
///
/// Uses `DashMap` so concurrent requests can register and unregister
/// without a service loop; each key's entry lock makes register/unregister
/// for the same id linearizable.
#[derive(Clone)]
pub struct ProcessRegistry {
    tasks: Arc<DashMap<String, ScheduledTask>>,
    scheduler: Scheduler,
    period: Duration,
}

impl ProcessRegistry {
    /// Create an empty registry whose tasks tick every `period`.
    pub fn new(scheduler: Scheduler, period: Duration) -> Self {
        Self {
            tasks: Arc::new(DashMap::new()),
            scheduler,
            period,
        }
    }

    /// Start the tick loop for `id` and track it.
    ///
    /// Fails without starting anything if `id` is already registered.
    pub fn register(&self, id: &str) -> Result<TaskHandle, RegistryError> {
        match self.tasks.entry(id.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::AlreadyRegistered(id.to_string())),
            Entry::Vacant(slot) => {
                let task = self.scheduler.start(id, self.period)?;
                let handle = task.handle().clone();
                slot.insert(task);
                info!(process_id = %id, "Process registered");
                Ok(handle)
            }
        }
    }

    /// Cancel and forget the tick loop for `id`.
    ///
    /// Returns whether an entry existed. Does not wait for an in-flight tick.
    pub fn unregister(&self, id: &str) -> bool {
        match self.tasks.remove(id) {
            Some((_, task)) => {
                task.cancel();
                info!(process_id = %id, "Process unregistered");
                true
            }
            None => {
                debug!(process_id = %id, "No scheduled task to unregister");
                false
            }
        }
    }

    pub fn lookup(&self, id: &str) -> Option<TaskHandle> {
        self.tasks.get(id).map(|task| task.handle().clone())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Ids of every registered process, in no particular order.
    pub fn ids(&self) -> Vec<String> {
        self.tasks.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Cancel every task and wait for the tick loops to exit.
    pub async fn shutdown(&self) {
        let ids = self.ids();
        let mut drained = Vec::with_capacity(ids.len());

        for id in ids {
            if let Some((_, task)) = self.tasks.remove(&id) {
                task.cancel();
                drained.push(task);
            }
        }

        if drained.is_empty() {
            return;
        }

        let count = drained.len();
        info!(count, "Cancelling scheduled tasks");
        for task in drained {
            task.join().await;
        }
        info!("All scheduled tasks stopped");
    }
}
