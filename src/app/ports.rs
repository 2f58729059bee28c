//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PublishScheduler (domain)
//! ```
//!
//! Driven adapters (GPIO, gateway, clock, event sinks, LED trigger) implement
//! these traits.  The [`PublishScheduler`](crate::scheduler::PublishScheduler)
//! consumes them via generics, so the domain core never touches hardware or
//! the network directly.

use crate::app::events::AppEvent;
use crate::app::payload::PublishPayload;
use crate::error::{HardwareError, PublishError};

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: hardware ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Digital level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// Capability set the sampler needs from the GPIO driver.
///
/// Pins are physical header numbers.  Implementations are not assumed to be
/// safe for concurrent access across pins; the scheduler calls them
/// sequentially from one thread.
pub trait GpioPort {
    /// Open `pin` as an input with pull-down bias.
    fn open_input(&mut self, pin: u8) -> Result<(), HardwareError>;

    /// Open `pin` as an output driven to `initial`.
    fn open_output(&mut self, pin: u8, initial: Level) -> Result<(), HardwareError>;

    /// Instantaneous level of `pin`.
    fn read(&mut self, pin: u8) -> Result<Level, HardwareError>;

    /// Fill `buf` with back-to-back samples of `pin`, one byte per sample
    /// (`0` = low, anything else = high), as fast as the driver allows.
    fn read_burst(&mut self, pin: u8, buf: &mut [u8]) -> Result<(), HardwareError>;

    /// Drive `pin` to `level`.
    fn write(&mut self, pin: u8, level: Level) -> Result<(), HardwareError>;

    /// Block the calling thread for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Gateway port (driven adapter: domain → network)
// ───────────────────────────────────────────────────────────────

/// Positive acknowledgement from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// HTTP status the gateway answered with.
    pub status: u16,
}

/// Pushes one payload to the remote gateway.
///
/// Called at most once per cycle; the scheduler never retries.
pub trait GatewayClient {
    fn publish(&mut self, payload: &PublishPayload) -> Result<Ack, PublishError>;
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: domain ↔ system clock)
// ───────────────────────────────────────────────────────────────

/// Clock and delay source for the scheduler.
pub trait TimePort {
    /// Monotonic milliseconds since an arbitrary origin.
    fn monotonic_ms(&self) -> u64;

    /// Wall-clock time as integer unix seconds.
    fn unix_secs(&self) -> u64;

    /// Block the calling thread for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Blink trigger (decouples scheduler from the indicator task)
// ───────────────────────────────────────────────────────────────

/// One-shot signal to the indicator: blink `count` times.
///
/// Implementations MUST return without waiting for the burst to run;
/// the scheduler arms its next cycle immediately afterwards.
pub trait BlinkTrigger {
    fn trigger(&mut self, count: usize);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The scheduler emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
