//! Periodic log scheduling.
//!
//! Every live process owns one tick loop that appends a log entry at a fixed
//! rate until its handle is cancelled.

mod error;
mod service;
mod sink;

pub use error::{Result, SchedulerError};
pub use service::{DEFAULT_TICK_INTERVAL, ScheduledTask, Scheduler, TaskHandle, TaskState};
pub use sink::{TickSink, TracingTickSink};
