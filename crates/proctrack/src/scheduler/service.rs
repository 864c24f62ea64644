//! Scheduler service for per-process tick loops.
//!
//! Each started task is one tokio task that sleeps until the next period
//! boundary, appends a log entry, and repeats until cancelled. Ticks are
//! fixed-rate: boundaries are measured from the task's start, not from the
//! end of the previous tick. Missed boundaries are skipped, so a slow store
//! never causes two ticks of the same process to overlap.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::process::ProcessLogEntry;
use crate::store::LogStore;

use super::error::{Result, SchedulerError};
use super::sink::{TickSink, TracingTickSink};

/// Default period between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(5000);

// ============================================================================
// Public API
// ============================================================================

/// Lifecycle of a scheduled task. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Scheduled,
    Cancelled,
}

/// Cheap, cloneable handle to a running tick loop.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    process_id: Arc<str>,
    period: Duration,
    cancel: CancellationToken,
    ticks: Arc<AtomicU64>,
}

impl TaskHandle {
    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn state(&self) -> TaskState {
        if self.cancel.is_cancelled() {
            TaskState::Cancelled
        } else {
            TaskState::Scheduled
        }
    }

    /// Number of ticks that ran to completion, successful or not.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Stop future ticks.
    ///
    /// A tick already in flight finishes and its write may still land. No
    /// tick starts after this returns.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// A started tick loop: its handle plus the task running it.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: TaskHandle,
    join: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the tick loop to exit. Only returns once cancelled.
    pub async fn join(self) {
        if let Err(e) = self.join.await {
            warn!(process_id = %self.handle.process_id, error = %e, "Tick loop panicked");
        }
    }
}

/// Starts tick loops that append to a shared log store.
#[derive(Clone)]
pub struct Scheduler {
    log_store: Arc<dyn LogStore>,
    sink: Arc<dyn TickSink>,
}

impl Scheduler {
    /// Create a scheduler that reports tick outcomes through `tracing`.
    pub fn new(log_store: Arc<dyn LogStore>) -> Self {
        Self {
            log_store,
            sink: Arc::new(TracingTickSink),
        }
    }

    /// Replace the diagnostic sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TickSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Start a tick loop for `process_id`.
    ///
    /// The first tick fires one `period` after this call, not immediately.
    pub fn start(&self, process_id: &str, period: Duration) -> Result<ScheduledTask> {
        if period.is_zero() {
            return Err(SchedulerError::InvalidPeriod);
        }

        let handle = TaskHandle {
            process_id: Arc::from(process_id),
            period,
            cancel: CancellationToken::new(),
            ticks: Arc::new(AtomicU64::new(0)),
        };
        let first_tick = Instant::now() + period;

        debug!(
            process_id = %process_id,
            period_ms = period.as_millis() as u64,
            "Starting tick loop"
        );

        let join = tokio::spawn(run_ticks(
            handle.clone(),
            first_tick,
            self.log_store.clone(),
            self.sink.clone(),
        ));

        Ok(ScheduledTask { handle, join })
    }
}

// ============================================================================
// Tick Loop
// ============================================================================

async fn run_ticks(
    handle: TaskHandle,
    first_tick: Instant,
    log_store: Arc<dyn LogStore>,
    sink: Arc<dyn TickSink>,
) {
    let mut interval = tokio::time::interval_at(first_tick, handle.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = handle.cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let entry = ProcessLogEntry::now(handle.process_id.as_ref());
        match log_store.append(&entry).await {
            Ok(()) => sink.tick_succeeded(&entry),
            Err(e) => sink.tick_failed(&handle.process_id, &e),
        }
        handle.ticks.fetch_add(1, Ordering::SeqCst);
    }

    debug!(process_id = %handle.process_id, ticks = handle.ticks(), "Tick loop stopped");
}
