//! Gateway payload assembly.
//!
//! Joins one cycle's [`SensorReading`]s against the configured sensors and
//! stamps the result with a single timestamp, so every state in a payload is
//! logically simultaneous.

use serde::{Deserialize, Serialize};

use crate::app::ports::TimePort;
use crate::config::SensorConfig;
use crate::error::ConfigMismatch;
use crate::sensors::SensorReading;

/// One machine's state inside a [`PublishPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    pub machine: String,
    pub pin: u8,
    pub state: bool,
}

/// JSON body of `POST {gateway}/events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishPayload {
    pub location: String,
    /// Unix seconds at the start of assembly.
    pub timestamp: u64,
    pub states: Vec<MachineState>,
}

impl PublishPayload {
    /// Number of machines reported as running.
    pub fn active_count(&self) -> usize {
        self.states.iter().filter(|s| s.state).count()
    }
}

/// Build the payload for one cycle.
///
/// `states` mirror the order of `readings`.  A reading whose pin has no
/// exact match in `sensors` fails the whole build; a partial payload is
/// never returned.
pub fn build(
    readings: &[SensorReading],
    sensors: &[SensorConfig],
    location: &str,
    clock: &impl TimePort,
) -> Result<PublishPayload, ConfigMismatch> {
    let timestamp = clock.unix_secs();

    let states = readings
        .iter()
        .map(|reading| {
            sensors
                .iter()
                .find(|s| s.pin == reading.pin)
                .map(|s| MachineState {
                    machine: s.id.clone(),
                    pin: reading.pin,
                    state: reading.state,
                })
                .ok_or(ConfigMismatch { pin: reading.pin })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PublishPayload {
        location: location.to_owned(),
        timestamp,
        states,
    })
}
