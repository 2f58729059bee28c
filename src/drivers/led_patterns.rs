//! Indicator animations as pure step sequences.
//!
//! Nothing here touches a pin or a timer.  Each animation is an iterator of
//! [`IndicatorStep`]s that [`StatusLed`](crate::drivers::status_led::StatusLed)
//! executes, so sequences can be checked without hardware or wall time.
//!
//! ## Startup
//!
//! ```text
//!   On ─400─ Off ─360─ On ─324─ Off ─ … ─ interval < min ─▶ On (steady)
//! ```
//!
//! Every toggle shrinks the interval by `decay`.  Once the next interval
//! would drop below `min_interval_ms` the LED is forced on and stays on.
//!
//! ## Blink burst
//!
//! ```text
//!   Off ─settle─ [On ─period─ Off ─period─] × count ─settle─ On
//! ```
//!
//! A burst of zero blinks still performs both settle pauses, which reads
//! as a short dark gap: the cycle ran but nothing was active.

use crate::app::ports::Level;
use crate::config::IndicatorConfig;

/// One instruction for the LED executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorStep {
    /// Drive the LED.
    Set(Level),
    /// Hold the current level for this many milliseconds.
    Wait(u64),
}

/// Which animation owns the LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorPhase {
    Startup,
    SteadyOn,
    Blinking,
}

/// Snapshot of the indicator, updated step by step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorState {
    pub phase: IndicatorPhase,
    /// Current startup toggle interval.  Unused outside `Startup`.
    pub interval_ms: f64,
    pub level: Level,
    /// On/off pairs still to run in the current burst.
    pub remaining_blinks: usize,
}

impl IndicatorState {
    /// Freshly powered indicator: about to start the startup animation.
    pub fn initial(config: &IndicatorConfig) -> Self {
        Self {
            phase: IndicatorPhase::Startup,
            interval_ms: config.startup_interval_ms,
            level: Level::Low,
            remaining_blinks: 0,
        }
    }
}

/// Decay law for the startup interval.
pub fn next_interval(interval_ms: f64, decay: f64) -> f64 {
    interval_ms * decay
}

/// Sum of every [`IndicatorStep::Wait`] in a step sequence.
pub fn total_wait_ms(steps: impl IntoIterator<Item = IndicatorStep>) -> u64 {
    steps
        .into_iter()
        .map(|step| match step {
            IndicatorStep::Wait(ms) => ms,
            IndicatorStep::Set(_) => 0,
        })
        .sum()
}

fn whole_ms(interval_ms: f64) -> u64 {
    interval_ms.round().max(0.0) as u64
}

fn toggled(level: Level) -> Level {
    match level {
        Level::High => Level::Low,
        Level::Low => Level::High,
    }
}

// ───────────────────────────────────────────────────────────────
// Startup animation
// ───────────────────────────────────────────────────────────────

/// Decaying-interval blink that settles into steady on.
///
/// Terminates for any `decay` in `(0, 1)` and `min_interval_ms > 0`, which
/// config validation guarantees.
#[derive(Debug, Clone)]
pub struct StartupAnimation {
    state: IndicatorState,
    decay: f64,
    min_interval_ms: f64,
    started: bool,
    waiting: bool,
}

impl StartupAnimation {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            state: IndicatorState::initial(config),
            decay: config.decay,
            min_interval_ms: config.min_interval_ms,
            started: false,
            waiting: false,
        }
    }

    pub fn state(&self) -> &IndicatorState {
        &self.state
    }
}

impl Iterator for StartupAnimation {
    type Item = IndicatorStep;

    fn next(&mut self) -> Option<IndicatorStep> {
        if self.state.phase == IndicatorPhase::SteadyOn {
            return None;
        }

        if !self.started {
            self.started = true;
            self.waiting = true;
            self.state.level = Level::High;
            return Some(IndicatorStep::Set(Level::High));
        }

        if self.waiting {
            self.waiting = false;
            return Some(IndicatorStep::Wait(whole_ms(self.state.interval_ms)));
        }

        let next = next_interval(self.state.interval_ms, self.decay);
        if next < self.min_interval_ms {
            self.state.phase = IndicatorPhase::SteadyOn;
            self.state.level = Level::High;
            return Some(IndicatorStep::Set(Level::High));
        }

        self.state.interval_ms = next;
        self.state.level = toggled(self.state.level);
        self.waiting = true;
        Some(IndicatorStep::Set(self.state.level))
    }
}

// ───────────────────────────────────────────────────────────────
// Blink burst
// ───────────────────────────────────────────────────────────────

/// `count` on/off pairs framed by two settle pauses, ending on.
#[derive(Debug, Clone)]
pub struct BlinkBurst {
    state: IndicatorState,
    settle_ms: u64,
    period_ms: u64,
    cursor: usize,
    len: usize,
}

impl BlinkBurst {
    pub fn new(count: usize, config: &IndicatorConfig) -> Self {
        Self {
            state: IndicatorState {
                phase: IndicatorPhase::Blinking,
                interval_ms: 0.0,
                level: Level::High,
                remaining_blinks: count,
            },
            settle_ms: config.settle_ms,
            period_ms: config.blink_period_ms,
            cursor: 0,
            len: 4 + 4 * count,
        }
    }

    pub fn state(&self) -> &IndicatorState {
        &self.state
    }
}

impl Iterator for BlinkBurst {
    type Item = IndicatorStep;

    fn next(&mut self) -> Option<IndicatorStep> {
        if self.cursor >= self.len {
            return None;
        }
        let i = self.cursor;
        self.cursor += 1;

        let step = match i {
            0 => IndicatorStep::Set(Level::Low),
            1 => IndicatorStep::Wait(self.settle_ms),
            i if i == self.len - 2 => IndicatorStep::Wait(self.settle_ms),
            i if i == self.len - 1 => {
                self.state.phase = IndicatorPhase::SteadyOn;
                IndicatorStep::Set(Level::High)
            }
            i => match (i - 2) % 4 {
                0 => IndicatorStep::Set(Level::High),
                2 => IndicatorStep::Set(Level::Low),
                3 => {
                    self.state.remaining_blinks -= 1;
                    IndicatorStep::Wait(self.period_ms)
                }
                _ => IndicatorStep::Wait(self.period_ms),
            },
        };

        if let IndicatorStep::Set(level) = step {
            self.state.level = level;
        }
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.len - self.cursor;
        (left, Some(left))
    }
}

impl ExactSizeIterator for BlinkBurst {}
