//! Presence-of-pulse debouncing for vibration/current contacts.
//!
//! The contacts on the machines chatter faster than the publish cadence, so
//! a running machine can read low at any single instant.  A sample here is a
//! burst of raw reads: the sensor is "on" if **any** read in the burst is
//! high, and "off" only if every read is low.  Majority or last-value voting
//! would report a running machine as idle whenever the burst caught a gap.

use heapless::Vec;
use log::trace;

use crate::app::ports::GpioPort;
use crate::config::MAX_SAMPLE_SIZE;
use crate::error::HardwareError;

/// Raw burst captured from one pin, one byte per read.
pub type RawSample = Vec<u8, MAX_SAMPLE_SIZE>;

/// `true` if any read in the burst was high.
pub fn any_high(samples: &[u8]) -> bool {
    samples.iter().any(|&b| b != 0)
}

/// Debounced state of `pin`.
///
/// Collects `sample_size` reads as a burst, then waits `sample_window_ms`
/// for the signal to settle before the next sensor is touched.  With
/// `sample_size == 1` this is a single direct read.  A failed read is
/// returned as an error, never reported as "off".
pub fn sample(
    port: &mut impl GpioPort,
    pin: u8,
    sample_size: usize,
    sample_window_ms: u64,
) -> Result<bool, HardwareError> {
    let state = match sample_size {
        0 => return Err(HardwareError::InvalidSampleSize),
        1 => port.read(pin)?.is_high(),
        n => {
            let mut buf = RawSample::new();
            buf.resize(n, 0)
                .map_err(|_| HardwareError::InvalidSampleSize)?;
            port.read_burst(pin, &mut buf)?;
            let state = any_high(&buf);
            trace!(
                "pin {}: {} of {} reads high",
                pin,
                buf.iter().filter(|&&b| b != 0).count(),
                buf.len()
            );
            state
        }
    };

    port.sleep_ms(sample_window_ms);
    Ok(state)
}
