//! Indicator thread: hosts the async [`StatusLed`] loop.
//!
//! ```text
//!  ┌───────────────────────────────────────────────┐
//!  │  "indicator" thread                           │
//!  │  futures_lite::block_on                       │
//!  │   └─ edge_executor::LocalExecutor             │
//!  │       └─ StatusLed::run                       │
//!  │           startup → receive().await → burst   │
//!  └───────────────────────────────────────────────┘
//! ```
//!
//! The LED pin moves into the thread; nothing else touches it.

use std::io;
use std::thread::{self, JoinHandle};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embedded_hal::digital::OutputPin;
use log::info;

use crate::channels::{BLINK_CHANNEL, BLINK_DEPTH, BlinkRequest};
use crate::config::IndicatorConfig;
use crate::drivers::status_led::{EmbassyTimer, IndicatorTimer, StatusLed};

fn run_indicator_loop<P, T, const N: usize>(
    led: StatusLed<P, T>,
    requests: Receiver<'static, CriticalSectionRawMutex, BlinkRequest, N>,
) where
    P: OutputPin,
    T: IndicatorTimer,
{
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor.spawn(led.run(requests)).detach();

    info!("Indicator task started");
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

// ── Thread spawn ─────────────────────────────────────────────

/// Spawn the indicator on the global blink channel with `embassy-time` delays.
pub fn spawn<P>(pin: P, config: IndicatorConfig) -> io::Result<JoinHandle<()>>
where
    P: OutputPin + Send + 'static,
{
    spawn_with::<P, EmbassyTimer, BLINK_DEPTH>(pin, EmbassyTimer, config, BLINK_CHANNEL.receiver())
}

/// Spawn the indicator with an explicit timer and request channel.
pub fn spawn_with<P, T, const N: usize>(
    pin: P,
    timer: T,
    config: IndicatorConfig,
    requests: Receiver<'static, CriticalSectionRawMutex, BlinkRequest, N>,
) -> io::Result<JoinHandle<()>>
where
    P: OutputPin + Send + 'static,
    T: IndicatorTimer + Send + 'static,
{
    thread::Builder::new()
        .name("indicator".into())
        .spawn(move || run_indicator_loop(StatusLed::new(pin, timer, config), requests))
}
