//! Sensor subsystem: pin setup and per-cycle debounced reads.
//!
//! Sensors are sampled one after another, in configuration order, through a
//! single [`GpioPort`].  The resulting [`SensorReading`]s keep that order all
//! the way into the published payload.

pub mod debounce;

use log::{debug, info};

use crate::app::ports::GpioPort;
use crate::config::SensorConfig;
use crate::error::HardwareError;

/// Debounced result for one sensor in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub pin: u8,
    pub state: bool,
}

/// Open every sensor pin as a pull-down input.
///
/// Called once at startup; a pin that cannot be opened aborts startup.
pub fn init_sensors(port: &mut impl GpioPort, sensors: &[SensorConfig]) -> Result<(), HardwareError> {
    for sensor in sensors {
        port.open_input(sensor.pin)?;
        info!("Sensor '{}' ready on pin {}", sensor.id, sensor.pin);
    }
    Ok(())
}

/// Sample every sensor once.
///
/// The first hardware failure aborts the read; readings taken before it
/// are discarded with it.
pub fn read_all(
    port: &mut impl GpioPort,
    sensors: &[SensorConfig],
    sample_size: usize,
    sample_window_ms: u64,
) -> Result<Vec<SensorReading>, HardwareError> {
    let mut readings = Vec::with_capacity(sensors.len());
    for sensor in sensors {
        let state = debounce::sample(port, sensor.pin, sample_size, sample_window_ms)?;
        debug!("Sensor '{}' (pin {}) -> {}", sensor.id, sensor.pin, if state { "on" } else { "off" });
        readings.push(SensorReading { pin: sensor.pin, state });
    }
    Ok(readings)
}
