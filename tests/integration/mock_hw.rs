//! Mock adapters for integration tests.
//!
//! Every mock shares one simulated clock ([`SharedTime`]).  Sampling waits,
//! gateway latency, and scheduler sleeps all advance it, so tests can
//! assert on cycle timing without real delays.

use std::cell::Cell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use laundry_telemetry::app::events::AppEvent;
use laundry_telemetry::app::payload::PublishPayload;
use laundry_telemetry::app::ports::{Ack, BlinkTrigger, EventSink, GatewayClient, GpioPort, Level, TimePort};
use laundry_telemetry::config::{AgentConfig, IndicatorConfig, SensorConfig};
use laundry_telemetry::error::{HardwareError, PublishError};

/// Simulated milliseconds since test start.
pub type SharedTime = Rc<Cell<u64>>;

pub fn shared_time() -> SharedTime {
    Rc::new(Cell::new(0))
}

fn advance(time: &SharedTime, ms: u64) {
    time.set(time.get() + ms);
}

// ── Config ────────────────────────────────────────────────────

/// Two sensors on header pins 11 ("A") and 12 ("B").
pub fn two_sensor_config() -> AgentConfig {
    AgentConfig {
        sensors: vec![SensorConfig { id: "A".into(), pin: 11 }, SensorConfig { id: "B".into(), pin: 12 }],
        sample_size: 3,
        sample_window_ms: 50,
        publish_interval_ms: 1000,
        location_id: "laundry-3".into(),
        gateway: "http://gateway.test/api".into(),
        api_key: "k".into(),
        publishing: true,
        indicator_pin: 7,
        gateway_timeout_ms: 10_000,
        indicator: IndicatorConfig::default(),
    }
}

// ── MockGpio ──────────────────────────────────────────────────

pub struct MockGpio {
    time: SharedTime,
    opened: HashSet<u8>,
    /// Per-pin queue of bursts, one per cycle.  Empty queue reads low.
    bursts: HashMap<u8, VecDeque<Vec<u8>>>,
    /// Pins whose next read fails, once.
    fail_once: HashSet<u8>,
    /// `(time, pin)` of every burst or single read.
    pub reads: Vec<(u64, u8)>,
}

#[allow(dead_code)]
impl MockGpio {
    pub fn new(time: SharedTime) -> Self {
        Self {
            time,
            opened: HashSet::new(),
            bursts: HashMap::new(),
            fail_once: HashSet::new(),
            reads: Vec::new(),
        }
    }

    /// Open every sensor pin of `config`.
    pub fn opened_for(time: SharedTime, config: &AgentConfig) -> Self {
        let mut gpio = Self::new(time);
        for s in &config.sensors {
            gpio.open_input(s.pin).unwrap();
        }
        gpio
    }

    pub fn queue_burst(&mut self, pin: u8, samples: &[u8]) {
        self.bursts.entry(pin).or_default().push_back(samples.to_vec());
    }

    pub fn fail_next_read(&mut self, pin: u8) {
        self.fail_once.insert(pin);
    }

    fn check(&mut self, pin: u8) -> Result<(), HardwareError> {
        if !self.opened.contains(&pin) {
            return Err(HardwareError::NotOpened(pin));
        }
        self.reads.push((self.time.get(), pin));
        if self.fail_once.remove(&pin) {
            return Err(HardwareError::ReadFailed { pin, reason: "injected".into() });
        }
        Ok(())
    }
}

impl GpioPort for MockGpio {
    fn open_input(&mut self, pin: u8) -> Result<(), HardwareError> {
        self.opened.insert(pin);
        Ok(())
    }

    fn open_output(&mut self, pin: u8, _initial: Level) -> Result<(), HardwareError> {
        self.opened.insert(pin);
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level, HardwareError> {
        self.check(pin)?;
        let burst = self.bursts.get_mut(&pin).and_then(VecDeque::pop_front).unwrap_or_default();
        Ok(Level::from(burst.iter().any(|&b| b != 0)))
    }

    fn read_burst(&mut self, pin: u8, buf: &mut [u8]) -> Result<(), HardwareError> {
        self.check(pin)?;
        let burst = self.bursts.get_mut(&pin).and_then(VecDeque::pop_front).unwrap_or_default();
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = burst.get(i).copied().unwrap_or(0);
        }
        Ok(())
    }

    fn write(&mut self, _pin: u8, _level: Level) -> Result<(), HardwareError> {
        Ok(())
    }

    fn sleep_ms(&mut self, ms: u64) {
        advance(&self.time, ms);
    }
}

// ── MockGateway ───────────────────────────────────────────────

pub struct MockGateway {
    time: SharedTime,
    /// Scripted answers, oldest first.  Empty queue answers 200.
    responses: VecDeque<Result<Ack, PublishError>>,
    /// Simulated round-trip time of each call.
    pub latency_ms: u64,
    /// `(time, payload)` of every call, stamped when the call starts.
    pub calls: Vec<(u64, PublishPayload)>,
}

#[allow(dead_code)]
impl MockGateway {
    pub fn new(time: SharedTime) -> Self {
        Self {
            time,
            responses: VecDeque::new(),
            latency_ms: 0,
            calls: Vec::new(),
        }
    }

    pub fn respond(&mut self, response: Result<Ack, PublishError>) {
        self.responses.push_back(response);
    }
}

impl GatewayClient for MockGateway {
    fn publish(&mut self, payload: &PublishPayload) -> Result<Ack, PublishError> {
        self.calls.push((self.time.get(), payload.clone()));
        advance(&self.time, self.latency_ms);
        self.responses.pop_front().unwrap_or(Ok(Ack { status: 200 }))
    }
}

// ── FakeClock ─────────────────────────────────────────────────

pub struct FakeClock {
    time: SharedTime,
    /// `(time, ms)` of every scheduler sleep.
    pub sleeps: Vec<(u64, u64)>,
}

impl FakeClock {
    pub fn new(time: SharedTime) -> Self {
        Self { time, sleeps: Vec::new() }
    }
}

impl TimePort for FakeClock {
    fn monotonic_ms(&self) -> u64 {
        self.time.get()
    }

    fn unix_secs(&self) -> u64 {
        1_700_000_000 + self.time.get() / 1000
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.sleeps.push((self.time.get(), ms));
        advance(&self.time, ms);
    }
}

// ── RecordingTrigger ──────────────────────────────────────────

#[derive(Default)]
pub struct RecordingTrigger {
    pub counts: Vec<usize>,
}

impl BlinkTrigger for RecordingTrigger {
    fn trigger(&mut self, count: usize) {
        self.counts.push(count);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    time: SharedTime,
    pub events: Vec<(u64, AppEvent)>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new(time: SharedTime) -> Self {
        Self { time, events: Vec::new() }
    }

    /// Times at which each cycle reported completion.
    pub fn completion_times(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter(|(_, e)| matches!(e, AppEvent::CycleCompleted { .. }))
            .map(|(t, _)| *t)
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|(_, e)| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push((self.time.get(), event.clone()));
    }
}
