//! Status LED executor.
//!
//! Drives a single on/off LED through the step sequences of
//! [`led_patterns`](crate::drivers::led_patterns).  The pin is any
//! `embedded-hal` [`OutputPin`]; delays go through an [`IndicatorTimer`]
//! so the same code runs against `embassy-time` in production and an
//! instant recording timer in tests.
//!
//! ## Failure policy
//!
//! A failed pin write is logged and the animation carries on.  The indicator
//! is feedback only and must never take the agent down.

use core::future::Future;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embedded_hal::digital::{Error as _, OutputPin};
use log::{debug, warn};

use crate::app::ports::Level;
use crate::channels::BlinkRequest;
use crate::config::IndicatorConfig;
use crate::drivers::led_patterns::{BlinkBurst, IndicatorState, IndicatorStep, StartupAnimation};

/// Async millisecond delay used between indicator steps.
pub trait IndicatorTimer {
    fn delay_ms(&mut self, ms: u64) -> impl Future<Output = ()>;
}

/// Production timer backed by the `embassy-time` std driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyTimer;

impl IndicatorTimer for EmbassyTimer {
    async fn delay_ms(&mut self, ms: u64) {
        embassy_time::Timer::after_millis(ms).await;
    }
}

pub struct StatusLed<P, T> {
    pin: P,
    timer: T,
    config: IndicatorConfig,
    state: IndicatorState,
}

impl<P: OutputPin, T: IndicatorTimer> StatusLed<P, T> {
    pub fn new(pin: P, timer: T, config: IndicatorConfig) -> Self {
        Self {
            pin,
            timer,
            state: IndicatorState::initial(&config),
            config,
        }
    }

    pub fn state(&self) -> &IndicatorState {
        &self.state
    }

    /// Play the decaying startup blink.  Returns with the LED steady on.
    pub async fn run_startup(&mut self) {
        let mut anim = StartupAnimation::new(&self.config);
        while let Some(step) = anim.next() {
            self.apply(step).await;
            self.state = *anim.state();
        }
        debug!("Indicator steady on");
    }

    /// Blink `count` times, then return to steady on.
    pub async fn run_burst(&mut self, count: usize) {
        let mut burst = BlinkBurst::new(count, &self.config);
        while let Some(step) = burst.next() {
            self.apply(step).await;
            self.state = *burst.state();
        }
    }

    /// Wait for the next blink request and perform it.
    pub async fn serve_next<const N: usize>(
        &mut self,
        requests: &Receiver<'_, CriticalSectionRawMutex, BlinkRequest, N>,
    ) {
        let request = requests.receive().await;
        debug!("Indicator burst: {} blink(s)", request.count);
        self.run_burst(request.count).await;
    }

    /// Startup animation, then serve blink requests forever.  Never returns.
    pub async fn run<const N: usize>(mut self, requests: Receiver<'_, CriticalSectionRawMutex, BlinkRequest, N>) {
        self.run_startup().await;
        loop {
            self.serve_next(&requests).await;
        }
    }

    async fn apply(&mut self, step: IndicatorStep) {
        match step {
            IndicatorStep::Set(level) => self.write(level),
            IndicatorStep::Wait(ms) => self.timer.delay_ms(ms).await,
        }
    }

    fn write(&mut self, level: Level) {
        let result = match level {
            Level::High => self.pin.set_high(),
            Level::Low => self.pin.set_low(),
        };
        if let Err(e) = result {
            warn!("LED write failed ({:?}), continuing", e.kind());
        }
    }
}
