//! Scheduler → indicator blink channel.
//!
//! A bounded `embassy-sync` channel is the only state shared between the
//! publish loop and the indicator thread.
//!
//! ```text
//! ┌──────────────┐  BlinkRequest  ┌────────────────┐
//! │  Scheduler   │───────────────▶│ Indicator task │
//! │  (sync)      │   try_send     │ (async)        │
//! └──────────────┘                └────────────────┘
//! ```
//!
//! The scheduler side never waits.  If the indicator has fallen behind by
//! [`BLINK_DEPTH`] bursts, new requests are dropped with a warning.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};
use log::warn;

use crate::app::ports::BlinkTrigger;

/// Ask the indicator to blink `count` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkRequest {
    pub count: usize,
}

/// Queued bursts before requests start being dropped.
pub const BLINK_DEPTH: usize = 4;

pub type BlinkChannel = Channel<CriticalSectionRawMutex, BlinkRequest, BLINK_DEPTH>;

/// Blink requests: scheduler → indicator task.
pub static BLINK_CHANNEL: BlinkChannel = Channel::new();

/// [`BlinkTrigger`] that queues a [`BlinkRequest`] without blocking.
pub struct ChannelBlinkTrigger<'ch, const N: usize> {
    sender: Sender<'ch, CriticalSectionRawMutex, BlinkRequest, N>,
    dropped: u64,
}

impl<'ch, const N: usize> ChannelBlinkTrigger<'ch, N> {
    pub fn new(sender: Sender<'ch, CriticalSectionRawMutex, BlinkRequest, N>) -> Self {
        Self { sender, dropped: 0 }
    }

    /// Requests discarded because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl ChannelBlinkTrigger<'static, BLINK_DEPTH> {
    /// Trigger bound to [`BLINK_CHANNEL`].
    pub fn global() -> Self {
        Self::new(BLINK_CHANNEL.sender())
    }
}

impl<const N: usize> BlinkTrigger for ChannelBlinkTrigger<'_, N> {
    fn trigger(&mut self, count: usize) {
        if self.sender.try_send(BlinkRequest { count }).is_err() {
            self.dropped += 1;
            warn!("Indicator: blink channel full, dropping burst of {}", count);
        }
    }
}
