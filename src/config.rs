//! Agent configuration
//!
//! Loaded once at startup from a JSON file and treated as immutable for the
//! life of the process.  Every component receives it (or the piece it needs)
//! by reference.  Key names follow the deployed `config.json` files, hence
//! the mix of camelCase and lowercase renames.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins;

/// Largest burst a single sensor read may request.
pub const MAX_SAMPLE_SIZE: usize = 1024;

const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 10_000;

/// One physical sensor wired to a digital input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Machine identifier reported to the gateway.
    pub id: String,
    /// Physical header pin number.
    pub pin: u8,
}

/// Timing of the status LED animations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndicatorConfig {
    /// First toggle interval of the startup blink train.
    pub startup_interval_ms: f64,
    /// Factor applied to the interval after each startup toggle, in (0, 1).
    pub decay: f64,
    /// The startup train settles to steady-on once the interval drops below this.
    pub min_interval_ms: f64,
    /// Pause before and after a per-cycle blink burst.
    pub settle_ms: u64,
    /// Duration of each on and each off phase within a burst.
    pub blink_period_ms: u64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            startup_interval_ms: 400.0,
            decay: 0.9,
            min_interval_ms: 20.0,
            settle_ms: 500,
            blink_period_ms: 150,
        }
    }
}

/// Core agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Sensors in sampling (and payload) order.
    pub sensors: Vec<SensorConfig>,
    /// Number of raw reads per debounced sample.
    #[serde(rename = "sampleSize")]
    pub sample_size: usize,
    /// Settling delay after each burst (milliseconds).
    #[serde(rename = "sampleWindow")]
    pub sample_window_ms: u64,
    /// Delay between the end of one cycle and the start of the next (milliseconds).
    #[serde(rename = "publishInterval")]
    pub publish_interval_ms: u64,
    /// Location reported with every payload.
    #[serde(rename = "locationid")]
    pub location_id: String,
    /// Gateway base URL; payloads go to `{gateway}/events`.
    pub gateway: String,
    /// Sent verbatim in the `x-api-key` header.
    #[serde(rename = "apikey")]
    pub api_key: String,
    /// `false` runs every cycle without network I/O.
    #[serde(default = "default_publishing")]
    pub publishing: bool,
    /// Physical header pin driving the status LED.
    #[serde(rename = "indicatorPin")]
    pub indicator_pin: u8,
    /// Upper bound on a single gateway request.
    #[serde(rename = "gatewayTimeoutMs", default = "default_gateway_timeout_ms")]
    pub gateway_timeout_ms: u64,
    #[serde(default)]
    pub indicator: IndicatorConfig,
}

fn default_publishing() -> bool {
    true
}

fn default_gateway_timeout_ms() -> u64 {
    DEFAULT_GATEWAY_TIMEOUT_MS
}

impl AgentConfig {
    /// Read, parse, and validate the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json(&contents)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the agent cannot run with.
    ///
    /// Values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensors.is_empty() {
            return Err(invalid("sensors: at least one sensor is required"));
        }

        let mut seen_pins = HashSet::new();
        let mut ids = HashSet::new();
        for sensor in &self.sensors {
            if sensor.id.trim().is_empty() {
                return Err(invalid(format!("sensors: pin {} has an empty id", sensor.pin)));
            }
            if pins::bcm_line(sensor.pin).is_none() {
                return Err(invalid(format!("sensors: header pin {} is not a GPIO line", sensor.pin)));
            }
            if !seen_pins.insert(sensor.pin) {
                return Err(invalid(format!("sensors: pin {} used more than once", sensor.pin)));
            }
            if !ids.insert(sensor.id.as_str()) {
                return Err(invalid(format!("sensors: id '{}' used more than once", sensor.id)));
            }
        }

        if !(1..=MAX_SAMPLE_SIZE).contains(&self.sample_size) {
            return Err(invalid(format!(
                "sampleSize: must be within 1..={MAX_SAMPLE_SIZE}, got {}",
                self.sample_size
            )));
        }
        if self.publish_interval_ms == 0 {
            return Err(invalid("publishInterval: must be greater than zero"));
        }
        if self.location_id.trim().is_empty() {
            return Err(invalid("locationid: must not be empty"));
        }
        if self.gateway.trim().is_empty() {
            return Err(invalid("gateway: must not be empty"));
        }
        if pins::bcm_line(self.indicator_pin).is_none() {
            return Err(invalid(format!(
                "indicatorPin: header pin {} is not a GPIO line",
                self.indicator_pin
            )));
        }
        if seen_pins.contains(&self.indicator_pin) {
            return Err(invalid(format!(
                "indicatorPin: pin {} is also a sensor pin",
                self.indicator_pin
            )));
        }
        if self.gateway_timeout_ms == 0 {
            return Err(invalid("gatewayTimeoutMs: must be greater than zero"));
        }

        let ind = &self.indicator;
        if !(ind.decay > 0.0 && ind.decay < 1.0) {
            return Err(invalid(format!("indicator.decay: must be within (0, 1), got {}", ind.decay)));
        }
        if !(ind.min_interval_ms > 0.0) {
            return Err(invalid("indicator.minIntervalMs: must be greater than zero"));
        }
        if !ind.startup_interval_ms.is_finite() || ind.startup_interval_ms < 0.0 {
            return Err(invalid("indicator.startupIntervalMs: must be a finite, non-negative value"));
        }

        Ok(())
    }

    /// Loggable view with the API key masked.
    pub fn redacted(&self) -> Redacted<'_> {
        Redacted(self)
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// [`Display`](fmt::Display) wrapper that never prints the API key.
pub struct Redacted<'a>(&'a AgentConfig);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        write!(f, "location={} gateway={} apikey=", c.location_id, c.gateway)?;
        if c.api_key.is_empty() {
            write!(f, "<unset>")?;
        } else {
            write!(f, "***")?;
        }
        write!(
            f,
            " publishing={} sampleSize={} sampleWindow={}ms publishInterval={}ms indicatorPin={} sensors=[",
            c.publishing, c.sample_size, c.sample_window_ms, c.publish_interval_ms, c.indicator_pin
        )?;
        for (i, s) in c.sensors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}@{}", s.id, s.pin)?;
        }
        write!(f, "]")
    }
}
