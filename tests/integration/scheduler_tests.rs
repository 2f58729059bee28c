//! End-to-end publish cycles against mock adapters.

use laundry_telemetry::app::events::AppEvent;
use laundry_telemetry::app::payload::MachineState;
use laundry_telemetry::app::ports::Ack;
use laundry_telemetry::config::{AgentConfig, SensorConfig};
use laundry_telemetry::error::{Error, HardwareError, PublishError};
use laundry_telemetry::scheduler::{CycleOutcome, PublishScheduler, SchedulerPhase};

use crate::mock_hw::{
    FakeClock, MockGateway, MockGpio, RecordingSink, RecordingTrigger, SharedTime, shared_time, two_sensor_config,
};

type Sched<'c> = PublishScheduler<'c, MockGpio, MockGateway, FakeClock, RecordingTrigger, RecordingSink>;

fn scheduler<'c>(config: &'c AgentConfig, time: &SharedTime, gpio: MockGpio, gateway: MockGateway) -> Sched<'c> {
    PublishScheduler::new(
        config,
        gpio,
        gateway,
        FakeClock::new(time.clone()),
        RecordingTrigger::default(),
        RecordingSink::new(time.clone()),
    )
}

#[test]
fn one_active_sensor_publishes_and_blinks_once() {
    let config = two_sensor_config();
    let time = shared_time();
    let mut gpio = MockGpio::opened_for(time.clone(), &config);
    gpio.queue_burst(11, &[0, 1, 0]);
    gpio.queue_burst(12, &[0, 0, 0]);
    let mut sched = scheduler(&config, &time, gpio, MockGateway::new(time.clone()));

    let outcome = sched.run_cycle();

    assert!(matches!(outcome, CycleOutcome::Completed { active: 1, published: true }));
    assert_eq!(sched.phase(), SchedulerPhase::Idle);

    let calls = &sched.gateway().calls;
    assert_eq!(calls.len(), 1);
    let payload = &calls[0].1;
    assert_eq!(payload.location, "laundry-3");
    assert_eq!(
        payload.states,
        vec![
            MachineState { machine: "A".into(), pin: 11, state: true },
            MachineState { machine: "B".into(), pin: 12, state: false },
        ]
    );
    assert_eq!(sched.blink().counts, vec![1]);
}

#[test]
fn publishing_disabled_never_calls_gateway() {
    let mut config = two_sensor_config();
    config.publishing = false;
    let time = shared_time();
    let gpio = MockGpio::opened_for(time.clone(), &config);
    let mut sched = scheduler(&config, &time, gpio, MockGateway::new(time.clone()));

    let outcomes = sched.run_cycles(3);

    assert!(outcomes.iter().all(|o| matches!(o, CycleOutcome::Completed { published: false, .. })));
    assert!(sched.gateway().calls.is_empty());
    assert_eq!(sched.events().count(|e| matches!(e, AppEvent::DryRun { .. })), 3);
    assert_eq!(sched.blink().counts, vec![0, 0, 0]);
    assert_eq!(sched.publish_failures(), 0);
}

#[test]
fn gateway_failure_is_logged_and_next_cycle_runs_on_schedule() {
    let config = two_sensor_config();
    let time = shared_time();
    let gpio = MockGpio::opened_for(time.clone(), &config);
    let mut gateway = MockGateway::new(time.clone());
    gateway.respond(Err(PublishError::Status(503)));
    let mut sched = scheduler(&config, &time, gpio, gateway);

    let outcomes = sched.run_cycles(2);

    assert!(matches!(outcomes[0], CycleOutcome::Completed { published: false, .. }));
    assert!(matches!(outcomes[1], CycleOutcome::Completed { published: true, .. }));
    assert_eq!(sched.phase(), SchedulerPhase::Idle);
    assert_eq!(sched.publish_failures(), 1);
    assert_eq!(
        sched.events().count(|e| matches!(e, AppEvent::PublishFailed { error: PublishError::Status(503), .. })),
        1
    );

    // Failed cycle is not retried; the next one starts a full interval later.
    let calls: Vec<u64> = sched.gateway().calls.iter().map(|(t, _)| *t).collect();
    assert_eq!(calls, vec![100, 1200]);
    // The failed cycle still blinks.
    assert_eq!(sched.blink().counts, vec![0, 0]);
}

#[test]
fn consecutive_cycles_are_spaced_by_the_interval() {
    let config = two_sensor_config();
    let time = shared_time();
    let gpio = MockGpio::opened_for(time.clone(), &config);
    let mut sched = scheduler(&config, &time, gpio, MockGateway::new(time.clone()));

    sched.run_cycles(3);

    let calls: Vec<u64> = sched.gateway().calls.iter().map(|(t, _)| *t).collect();
    // 100 ms of sampling, then 1000 ms interval + 100 ms sampling per cycle.
    assert_eq!(calls, vec![100, 1200, 2300]);
    assert_eq!(sched.clock().sleeps, vec![(100, 1000), (1200, 1000)]);
}

#[test]
fn cycles_never_overlap_when_interval_is_shorter_than_cycle() {
    let mut config = two_sensor_config();
    config.publish_interval_ms = 100;
    let time = shared_time();
    let gpio = MockGpio::opened_for(time.clone(), &config);
    let mut gateway = MockGateway::new(time.clone());
    gateway.latency_ms = 5_000;
    let mut sched = scheduler(&config, &time, gpio, gateway);

    sched.run_cycles(4);

    let completed = sched.events().completion_times();
    let cycle_starts: Vec<u64> = sched.gpio().reads.chunks(2).map(|c| c[0].0).collect();
    assert_eq!(completed.len(), 4);
    assert_eq!(cycle_starts.len(), 4);
    for i in 1..4 {
        assert!(cycle_starts[i] >= completed[i - 1], "cycle {i} started before cycle {} ended", i - 1);
        assert_eq!(cycle_starts[i] - completed[i - 1], 100, "fixed delay after cycle {}", i - 1);
    }
}

#[test]
fn sampling_failure_aborts_only_that_cycle() {
    let config = two_sensor_config();
    let time = shared_time();
    let mut gpio = MockGpio::opened_for(time.clone(), &config);
    gpio.fail_next_read(12);
    gpio.queue_burst(11, &[1, 1, 1]);
    gpio.queue_burst(11, &[1, 1, 1]);
    let mut sched = scheduler(&config, &time, gpio, MockGateway::new(time.clone()));

    let outcomes = sched.run_cycles(2);

    assert!(matches!(
        outcomes[0],
        CycleOutcome::Aborted(Error::Hardware(HardwareError::ReadFailed { pin: 12, .. }))
    ));
    assert!(matches!(outcomes[1], CycleOutcome::Completed { active: 1, published: true }));
    assert_eq!(sched.gateway().calls.len(), 1);
    // No burst for the aborted cycle.
    assert_eq!(sched.blink().counts, vec![1]);
    assert_eq!(sched.cycles_aborted(), 1);
    assert_eq!(sched.cycles_completed(), 1);
    assert_eq!(sched.phase(), SchedulerPhase::Idle);
}

#[test]
fn blink_count_tracks_active_sensors() {
    let mut config = two_sensor_config();
    config.sensors.push(SensorConfig { id: "C".into(), pin: 13 });
    let time = shared_time();
    let mut gpio = MockGpio::opened_for(time.clone(), &config);
    for pin in [11, 12, 13] {
        gpio.queue_burst(pin, &[0, 0, 1]);
    }
    gpio.queue_burst(12, &[1, 0, 0]);
    let mut sched = scheduler(&config, &time, gpio, MockGateway::new(time.clone()));

    sched.run_cycles(3);

    assert_eq!(sched.blink().counts, vec![3, 1, 0]);
}

#[test]
fn single_read_mode_still_waits_the_window() {
    let mut config = two_sensor_config();
    config.sample_size = 1;
    let time = shared_time();
    let mut gpio = MockGpio::opened_for(time.clone(), &config);
    gpio.queue_burst(12, &[1]);
    let mut sched = scheduler(&config, &time, gpio, MockGateway::new(time.clone()));

    let outcome = sched.run_cycle();

    assert!(matches!(outcome, CycleOutcome::Completed { active: 1, .. }));
    assert_eq!(sched.gateway().calls[0].0, 100);
}

#[test]
fn started_event_precedes_first_cycle() {
    let config = two_sensor_config();
    let time = shared_time();
    let gpio = MockGpio::opened_for(time.clone(), &config);
    let mut gateway = MockGateway::new(time.clone());
    gateway.respond(Ok(Ack { status: 200 }));
    let mut sched = scheduler(&config, &time, gpio, gateway);

    sched.run_cycles(1);

    let events = &sched.events().events;
    assert!(matches!(events[0].1, AppEvent::Started { sensors: 2, interval_ms: 1000, publishing: true }));
    assert!(matches!(events.last().map(|e| &e.1), Some(AppEvent::CycleCompleted { cycle: 1, total: 2, .. })));
}
