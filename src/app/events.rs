//! Outbound application events.
//!
//! The [`PublishScheduler`](crate::scheduler::PublishScheduler) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them; the shipped one logs them.

use crate::error::{ConfigMismatch, HardwareError, PublishError};

/// Structured events emitted by the scheduler.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The scheduler loop has started.
    Started { sensors: usize, interval_ms: u64, publishing: bool },

    /// A cycle ran to completion (publish may still have failed).
    CycleCompleted { cycle: u64, active: usize, total: usize, published: bool },

    /// Sampling failed; nothing was built or published.
    SamplingFailed { cycle: u64, error: HardwareError },

    /// The payload could not be assembled; nothing was published.
    BuildFailed { cycle: u64, error: ConfigMismatch },

    /// The gateway rejected the payload or was unreachable.
    PublishFailed { cycle: u64, error: PublishError },

    /// Publishing is disabled; carries the payload that would have been sent.
    DryRun { cycle: u64, body: String },

    /// A trigger arrived while the previous cycle was still in flight.
    CycleSkipped,
}
