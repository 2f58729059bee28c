//! Fuzz target: `AgentConfig::from_json`
//!
//! Feeds arbitrary bytes through the config parser and validator.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Any config that validates has a sample size the burst buffer can hold
//! - Any config that validates has unique sensor pins, none shared with the LED
//! - The loggable view always masks the API key
//!
//! cargo fuzz run fuzz_config_parse

#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use laundry_telemetry::config::{AgentConfig, MAX_SAMPLE_SIZE};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = AgentConfig::from_json(text) else {
        return;
    };

    assert!((1..=MAX_SAMPLE_SIZE).contains(&config.sample_size));
    assert!(config.publish_interval_ms > 0);

    let mut pins = HashSet::new();
    for sensor in &config.sensors {
        assert!(pins.insert(sensor.pin), "duplicate pin accepted");
    }
    assert!(!pins.contains(&config.indicator_pin));

    let shown = config.redacted().to_string();
    assert!(shown.contains("apikey=***") || shown.contains("apikey=<unset>"));
});
