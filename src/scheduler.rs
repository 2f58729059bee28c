//! Publish scheduler: the agent's top-level control loop.
//!
//! One cycle samples every sensor, builds a payload, publishes it, and asks
//! the indicator for a blink burst.  Cycles are spaced with a **fixed delay**:
//! the next one starts `publishInterval` after the previous one finished, so
//! a slow gateway stretches the period instead of stacking cycles.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │   Idle ──▶ Sampling ──▶ Building ──▶ Publishing ──▶ Idle     │
//! │              │             │             │                   │
//! │          HardwareError  ConfigMismatch  PublishError         │
//! │              │             │             │ (logged,          │
//! │              ▼             ▼             │  cycle completes) │
//! │           Aborted       Aborted          ▼                   │
//! │                                     BlinkTrigger(active)     │
//! │                                                              │
//! │   sleep(publishInterval) ◀───────────── every outcome        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! No error ends the loop.  An aborted cycle publishes nothing and does not
//! blink; the next cycle runs on schedule.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::payload;
use crate::app::ports::{BlinkTrigger, EventSink, GatewayClient, GpioPort, TimePort};
use crate::config::AgentConfig;
use crate::error::Error;
use crate::sensors;

// ═══════════════════════════════════════════════════════════════
//  Cycle types
// ═══════════════════════════════════════════════════════════════

/// Where the cycle currently in flight is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Sampling,
    Building,
    Publishing,
}

/// Result of one [`PublishScheduler::run_cycle`] call.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Sampling and building succeeded.  `published` is `false` for a dry
    /// run or a failed publish.
    Completed { active: usize, published: bool },
    /// Sampling or building failed; nothing was sent.
    Aborted(Error),
    /// A cycle was already in flight.
    Skipped,
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Running counters since the scheduler was created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles_completed: u64,
    pub cycles_aborted: u64,
    pub cycles_skipped: u64,
    pub publish_failures: u64,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Drives sampling and publishing through the port traits.
///
/// Generic over every collaborator so tests can substitute mocks for the
/// GPIO bank, the gateway, the clock, the indicator, and the event sink.
pub struct PublishScheduler<'cfg, G, C, T, B, S> {
    config: &'cfg AgentConfig,
    gpio: G,
    gateway: C,
    clock: T,
    blink: B,
    events: S,
    phase: SchedulerPhase,
    cycle: u64,
    stats: CycleStats,
    started: bool,
}

impl<'cfg, G, C, T, B, S> PublishScheduler<'cfg, G, C, T, B, S>
where
    G: GpioPort,
    C: GatewayClient,
    T: TimePort,
    B: BlinkTrigger,
    S: EventSink,
{
    /// Sensor pins must already be opened (see [`sensors::init_sensors`]).
    pub fn new(config: &'cfg AgentConfig, gpio: G, gateway: C, clock: T, blink: B, events: S) -> Self {
        Self {
            config,
            gpio,
            gateway,
            clock,
            blink,
            events,
            phase: SchedulerPhase::Idle,
            cycle: 0,
            stats: CycleStats::default(),
            started: false,
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn cycles_completed(&self) -> u64 {
        self.stats.cycles_completed
    }

    pub fn cycles_aborted(&self) -> u64 {
        self.stats.cycles_aborted
    }

    pub fn publish_failures(&self) -> u64 {
        self.stats.publish_failures
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn gateway(&self) -> &C {
        &self.gateway
    }

    pub fn clock(&self) -> &T {
        &self.clock
    }

    pub fn blink(&self) -> &B {
        &self.blink
    }

    pub fn events(&self) -> &S {
        &self.events
    }

    /// Run forever, one cycle every `publishInterval` after the last one ends.
    pub fn run(mut self) -> ! {
        self.announce();
        loop {
            self.run_cycle();
            self.clock.sleep_ms(self.config.publish_interval_ms);
        }
    }

    /// Run `n` cycles, sleeping `publishInterval` between consecutive ones.
    pub fn run_cycles(&mut self, n: usize) -> Vec<CycleOutcome> {
        self.announce();
        let mut outcomes = Vec::with_capacity(n);
        for i in 0..n {
            if i > 0 {
                self.clock.sleep_ms(self.config.publish_interval_ms);
            }
            outcomes.push(self.run_cycle());
        }
        outcomes
    }

    /// Execute a single sample → build → publish cycle.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        if self.phase != SchedulerPhase::Idle {
            self.stats.cycles_skipped += 1;
            self.events.emit(&AppEvent::CycleSkipped);
            return CycleOutcome::Skipped;
        }

        self.cycle += 1;
        let started_ms = self.clock.monotonic_ms();
        let outcome = self.execute(self.cycle);
        self.phase = SchedulerPhase::Idle;

        match &outcome {
            CycleOutcome::Completed { .. } => self.stats.cycles_completed += 1,
            CycleOutcome::Aborted(_) => self.stats.cycles_aborted += 1,
            CycleOutcome::Skipped => {}
        }
        debug!(
            "Scheduler: cycle {} done in {} ms | completed={} aborted={} publish_failures={}",
            self.cycle,
            self.clock.monotonic_ms().saturating_sub(started_ms),
            self.stats.cycles_completed,
            self.stats.cycles_aborted,
            self.stats.publish_failures,
        );
        outcome
    }

    fn announce(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(
            "Scheduler: {} sensor(s), every {} ms, publishing {}",
            self.config.sensors.len(),
            self.config.publish_interval_ms,
            if self.config.publishing { "on" } else { "off (dry run)" }
        );
        self.events.emit(&AppEvent::Started {
            sensors: self.config.sensors.len(),
            interval_ms: self.config.publish_interval_ms,
            publishing: self.config.publishing,
        });
    }

    fn execute(&mut self, cycle: u64) -> CycleOutcome {
        let cfg = self.config;

        self.phase = SchedulerPhase::Sampling;
        let readings = match sensors::read_all(&mut self.gpio, &cfg.sensors, cfg.sample_size, cfg.sample_window_ms) {
            Ok(r) => r,
            Err(e) => {
                self.events.emit(&AppEvent::SamplingFailed { cycle, error: e.clone() });
                return CycleOutcome::Aborted(e.into());
            }
        };

        self.phase = SchedulerPhase::Building;
        // Readings are taken from `cfg.sensors`, so this arm is a guard only.
        let payload = match payload::build(&readings, &cfg.sensors, &cfg.location_id, &self.clock) {
            Ok(p) => p,
            Err(e) => {
                self.events.emit(&AppEvent::BuildFailed { cycle, error: e });
                return CycleOutcome::Aborted(e.into());
            }
        };

        self.phase = SchedulerPhase::Publishing;
        let published = if cfg.publishing {
            match self.gateway.publish(&payload) {
                Ok(ack) => {
                    debug!("Scheduler: cycle {} acknowledged ({})", cycle, ack.status);
                    true
                }
                Err(e) => {
                    self.stats.publish_failures += 1;
                    self.events.emit(&AppEvent::PublishFailed { cycle, error: e });
                    false
                }
            }
        } else {
            let body = serde_json::to_string(&payload).unwrap_or_else(|e| format!("<unencodable: {e}>"));
            self.events.emit(&AppEvent::DryRun { cycle, body });
            false
        };

        let active = payload.active_count();
        self.blink.trigger(active);
        self.events.emit(&AppEvent::CycleCompleted {
            cycle,
            active,
            total: payload.states.len(),
            published,
        });

        CycleOutcome::Completed { active, published }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
