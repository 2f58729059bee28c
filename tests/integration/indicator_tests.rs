//! Indicator thread running alongside the publish loop.
//!
//! The LED timer is gated shut, so the indicator is stuck inside its first
//! delay while the scheduler runs.  The scheduler must still finish every
//! cycle, and the queued bursts must all play once the gate opens.

use core::convert::Infallible;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embedded_hal::digital::{ErrorType, OutputPin};

use laundry_telemetry::app::ports::Level;
use laundry_telemetry::channels::{BLINK_DEPTH, BlinkRequest, ChannelBlinkTrigger};
use laundry_telemetry::config::IndicatorConfig;
use laundry_telemetry::drivers::indicator_task;
use laundry_telemetry::drivers::status_led::{EmbassyTimer, IndicatorTimer};
use laundry_telemetry::scheduler::PublishScheduler;

use crate::mock_hw::{FakeClock, MockGateway, MockGpio, RecordingSink, shared_time, two_sensor_config};

static TEST_BLINKS: Channel<CriticalSectionRawMutex, BlinkRequest, BLINK_DEPTH> = Channel::new();
static TIMED_BLINKS: Channel<CriticalSectionRawMutex, BlinkRequest, BLINK_DEPTH> = Channel::new();

#[derive(Clone, Default)]
struct SharedLed(Arc<Mutex<Vec<Level>>>);

impl ErrorType for SharedLed {
    type Error = Infallible;
}

impl OutputPin for SharedLed {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.lock().unwrap().push(Level::Low);
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.lock().unwrap().push(Level::High);
        Ok(())
    }
}

/// Delay that blocks the indicator thread until the gate is opened.
#[derive(Clone, Default)]
struct GatedTimer(Arc<(Mutex<bool>, Condvar)>);

impl GatedTimer {
    fn open(&self) {
        let (lock, cv) = &*self.0;
        *lock.lock().unwrap() = true;
        cv.notify_all();
    }
}

impl IndicatorTimer for GatedTimer {
    async fn delay_ms(&mut self, _ms: u64) {
        let (lock, cv) = &*self.0;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cv.wait(open).unwrap();
        }
    }
}

fn wait_for_writes(led: &SharedLed, expected: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let n = led.0.lock().unwrap().len();
        if n >= expected || Instant::now() > deadline {
            return n;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn scheduler_never_waits_for_the_indicator() {
    let led = SharedLed::default();
    let timer = GatedTimer::default();
    // Startup: On, Off, On, forced On (4 writes).
    let indicator = IndicatorConfig {
        startup_interval_ms: 100.0,
        decay: 0.5,
        min_interval_ms: 20.0,
        settle_ms: 10,
        blink_period_ms: 10,
    };
    indicator_task::spawn_with(led.clone(), timer.clone(), indicator, TEST_BLINKS.receiver()).unwrap();

    let config = two_sensor_config();
    let time = shared_time();
    let mut gpio = MockGpio::opened_for(time.clone(), &config);
    for _ in 0..6 {
        gpio.queue_burst(11, &[1, 0, 0]);
    }
    let mut sched = PublishScheduler::new(
        &config,
        gpio,
        MockGateway::new(time.clone()),
        FakeClock::new(time.clone()),
        ChannelBlinkTrigger::new(TEST_BLINKS.sender()),
        RecordingSink::new(time.clone()),
    );

    let outcomes = sched.run_cycles(6);
    assert!(outcomes.iter().all(|o| o.is_completed()));
    assert_eq!(sched.cycles_completed(), 6);
    // Indicator is parked in its first delay: four bursts queue, two drop.
    assert_eq!(sched.blink().dropped(), 2);

    timer.open();
    // Startup (4 writes) + 4 bursts of one blink (4 writes each).
    let expected = 4 + 4 * 4;
    assert_eq!(wait_for_writes(&led, expected), expected);
    std::thread::sleep(Duration::from_millis(50));

    let writes = led.0.lock().unwrap();
    assert_eq!(writes.len(), expected, "no extra bursts after the queue drained");
    assert_eq!(writes.last(), Some(&Level::High));
}

#[test]
fn embassy_timer_drives_startup_and_burst() {
    let led = SharedLed::default();
    // Startup: On, Off, On, forced On (4 writes).  Burst of 2: 6 writes.
    let indicator = IndicatorConfig {
        startup_interval_ms: 100.0,
        decay: 0.5,
        min_interval_ms: 20.0,
        settle_ms: 50,
        blink_period_ms: 20,
    };
    TIMED_BLINKS.try_send(BlinkRequest { count: 2 }).unwrap();

    let started = Instant::now();
    indicator_task::spawn_with(led.clone(), EmbassyTimer, indicator, TIMED_BLINKS.receiver()).unwrap();

    let expected = 4 + 6;
    assert_eq!(wait_for_writes(&led, expected), expected);
    // 175 ms of startup delays plus 180 ms of burst delays.
    assert!(started.elapsed() >= Duration::from_millis(300), "delays were skipped");
    std::thread::sleep(Duration::from_millis(100));

    let writes = led.0.lock().unwrap();
    assert_eq!(writes.len(), expected);
    assert_eq!(writes.last(), Some(&Level::High));
}
