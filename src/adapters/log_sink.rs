//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each scheduler event as one
//! `TAG | key=value` line through the `log` facade.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { sensors, interval_ms, publishing } => {
                info!("START | sensors={} interval={}ms publishing={}", sensors, interval_ms, publishing);
            }
            AppEvent::CycleCompleted { cycle, active, total, published } => {
                info!("CYCLE | n={} active={}/{} published={}", cycle, active, total, published);
            }
            AppEvent::SamplingFailed { cycle, error: e } => {
                error!("ABORT | n={} stage=sampling error={}", cycle, e);
            }
            AppEvent::BuildFailed { cycle, error: e } => {
                error!("ABORT | n={} stage=build error={}", cycle, e);
            }
            AppEvent::PublishFailed { cycle, error: e } => {
                warn!("PUBLISH | n={} failed error={}", cycle, e);
            }
            AppEvent::DryRun { cycle, body } => {
                info!("DRYRUN | n={} body={}", cycle, body);
            }
            AppEvent::CycleSkipped => {
                warn!("SKIP | previous cycle still in flight");
            }
        }
    }
}
