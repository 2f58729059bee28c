//! GPIO adapters.
//!
//! - **Linux**: [`SysfsGpio`] drives `/sys/class/gpio`, translating
//!   physical header positions to BCM lines through [`crate::pins`].
//! - **Everywhere**: [`SimGpio`] keeps pin state in memory for
//!   `--simulate` runs and tests.
//!
//! [`GpioOutputPin`] turns one output of any [`GpioPort`] into an
//! `embedded-hal` [`OutputPin`] so the indicator driver stays HAL-generic.

use std::collections::HashMap;
use std::time::Duration;

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::app::ports::{GpioPort, Level};
use crate::error::HardwareError;

// ───────────────────────────────────────────────────────────────
// Linux sysfs
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "linux")]
pub use sysfs::SysfsGpio;

#[cfg(target_os = "linux")]
mod sysfs {
    use std::collections::HashMap;
    use std::fs::{File, OpenOptions};
    use std::io::{Read, Seek, SeekFrom, Write};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use log::{debug, info};

    use crate::app::ports::{GpioPort, Level};
    use crate::error::HardwareError;
    use crate::pins;

    /// Attempts to configure a freshly exported line before giving up.
    /// udev applies permissions asynchronously after export.
    const EXPORT_RETRIES: u32 = 20;
    const EXPORT_RETRY_DELAY: Duration = Duration::from_millis(10);

    struct SysfsPin {
        value: File,
        output: bool,
    }

    /// GPIO bank behind the kernel's sysfs interface.
    ///
    /// Sysfs cannot set bias; inputs rely on the board's pull-down resistors.
    pub struct SysfsGpio {
        root: PathBuf,
        /// Added to every BCM line (non-zero on kernels that renumber gpiochip0).
        base: u32,
        pins: HashMap<u8, SysfsPin>,
    }

    impl SysfsGpio {
        pub fn new() -> Self {
            Self::with_root("/sys/class/gpio", 0)
        }

        pub fn with_root(root: impl Into<PathBuf>, base: u32) -> Self {
            Self {
                root: root.into(),
                base,
                pins: HashMap::new(),
            }
        }

        fn line_dir(&self, line: u32) -> PathBuf {
            self.root.join(format!("gpio{line}"))
        }

        fn open_pin(&mut self, pin: u8, direction: &str) -> Result<(), HardwareError> {
            let line = u32::from(pins::require_bcm_line(pin)?) + self.base;
            let open_err = |e: std::io::Error| HardwareError::OpenFailed { pin, reason: e.to_string() };

            let dir = self.line_dir(line);
            if !dir.exists() {
                write_str(&self.root.join("export"), &line.to_string()).map_err(open_err)?;
                debug!("gpio: exported line {} for header pin {}", line, pin);
            }

            let mut attempt = 0;
            loop {
                match write_str(&dir.join("direction"), direction) {
                    Ok(()) => break,
                    Err(e) if attempt + 1 >= EXPORT_RETRIES => return Err(open_err(e)),
                    Err(_) => {
                        attempt += 1;
                        std::thread::sleep(EXPORT_RETRY_DELAY);
                    }
                }
            }

            let output = direction != "in";
            let value = OpenOptions::new()
                .read(true)
                .write(output)
                .open(dir.join("value"))
                .map_err(open_err)?;
            self.pins.insert(pin, SysfsPin { value, output });
            info!("gpio: header pin {} (line {}) opened as {}", pin, line, direction);
            Ok(())
        }

        fn read_level(&mut self, pin: u8) -> Result<Level, HardwareError> {
            let handle = self.pins.get_mut(&pin).ok_or(HardwareError::NotOpened(pin))?;
            let mut byte = [0u8; 1];
            handle
                .value
                .seek(SeekFrom::Start(0))
                .and_then(|_| handle.value.read_exact(&mut byte))
                .map_err(|e| HardwareError::ReadFailed { pin, reason: e.to_string() })?;
            Ok(Level::from(byte[0] == b'1'))
        }
    }

    impl Default for SysfsGpio {
        fn default() -> Self {
            Self::new()
        }
    }

    fn write_str(path: &Path, s: &str) -> std::io::Result<()> {
        OpenOptions::new().write(true).truncate(true).open(path)?.write_all(s.as_bytes())
    }

    impl GpioPort for SysfsGpio {
        fn open_input(&mut self, pin: u8) -> Result<(), HardwareError> {
            self.open_pin(pin, "in")
        }

        fn open_output(&mut self, pin: u8, initial: Level) -> Result<(), HardwareError> {
            // "high"/"low" set direction and initial level atomically
            self.open_pin(pin, if initial.is_high() { "high" } else { "low" })
        }

        fn read(&mut self, pin: u8) -> Result<Level, HardwareError> {
            self.read_level(pin)
        }

        fn read_burst(&mut self, pin: u8, buf: &mut [u8]) -> Result<(), HardwareError> {
            for slot in buf.iter_mut() {
                *slot = u8::from(self.read_level(pin)?.is_high());
            }
            Ok(())
        }

        fn write(&mut self, pin: u8, level: Level) -> Result<(), HardwareError> {
            let handle = self.pins.get_mut(&pin).ok_or(HardwareError::NotOpened(pin))?;
            if !handle.output {
                return Err(HardwareError::WriteFailed { pin, reason: "pin is an input".into() });
            }
            let byte: &[u8] = if level.is_high() { b"1" } else { b"0" };
            handle
                .value
                .seek(SeekFrom::Start(0))
                .and_then(|_| handle.value.write_all(byte))
                .map_err(|e| HardwareError::WriteFailed { pin, reason: e.to_string() })
        }

        fn sleep_ms(&mut self, ms: u64) {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }

}

// ───────────────────────────────────────────────────────────────
// In-memory simulation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct SimPin {
    opened: bool,
    output: bool,
    level: Level,
    burst: Vec<u8>,
    fail_reads: bool,
    written: Vec<Level>,
}

/// In-memory GPIO bank.
///
/// Inputs read their configured level, or replay a scripted burst.  Sleeps
/// are counted and only block the thread when created with
/// [`SimGpio::realtime`].
#[derive(Debug, Clone, Default)]
pub struct SimGpio {
    pins: HashMap<u8, SimPin>,
    realtime: bool,
    slept_ms: u64,
}

impl SimGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulation whose `sleep_ms` really sleeps, for `--simulate` runs.
    pub fn realtime() -> Self {
        Self { realtime: true, ..Self::default() }
    }

    /// Level returned by `read` and by bursts without a script.
    pub fn set_level(&mut self, pin: u8, level: Level) {
        self.pins.entry(pin).or_default().level = level;
    }

    /// Script the next bursts on `pin`; reads past the end are low.
    pub fn set_burst(&mut self, pin: u8, samples: &[u8]) {
        self.pins.entry(pin).or_default().burst = samples.to_vec();
    }

    pub fn fail_reads(&mut self, pin: u8, fail: bool) {
        self.pins.entry(pin).or_default().fail_reads = fail;
    }

    pub fn is_input(&self, pin: u8) -> bool {
        self.pins.get(&pin).is_some_and(|p| p.opened && !p.output)
    }

    /// Every level written to `pin`, oldest first.
    pub fn written(&self, pin: u8) -> &[Level] {
        self.pins.get(&pin).map(|p| p.written.as_slice()).unwrap_or(&[])
    }

    pub fn slept_ms(&self) -> u64 {
        self.slept_ms
    }

    fn open(&mut self, pin: u8, output: bool) -> Result<&mut SimPin, HardwareError> {
        crate::pins::require_bcm_line(pin)?;
        let entry = self.pins.entry(pin).or_default();
        entry.opened = true;
        entry.output = output;
        Ok(entry)
    }

    fn readable(&self, pin: u8) -> Result<&SimPin, HardwareError> {
        match self.pins.get(&pin) {
            Some(p) if !p.opened => Err(HardwareError::NotOpened(pin)),
            Some(p) if p.fail_reads => Err(HardwareError::ReadFailed { pin, reason: "simulated fault".into() }),
            Some(p) => Ok(p),
            None => Err(HardwareError::NotOpened(pin)),
        }
    }
}

impl GpioPort for SimGpio {
    fn open_input(&mut self, pin: u8) -> Result<(), HardwareError> {
        self.open(pin, false).map(|_| ())
    }

    fn open_output(&mut self, pin: u8, initial: Level) -> Result<(), HardwareError> {
        let p = self.open(pin, true)?;
        p.level = initial;
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level, HardwareError> {
        Ok(self.readable(pin)?.level)
    }

    fn read_burst(&mut self, pin: u8, buf: &mut [u8]) -> Result<(), HardwareError> {
        let p = self.readable(pin)?;
        if p.burst.is_empty() {
            buf.fill(u8::from(p.level.is_high()));
        } else {
            for (i, slot) in buf.iter_mut().enumerate() {
                *slot = p.burst.get(i).copied().unwrap_or(0);
            }
        }
        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), HardwareError> {
        match self.pins.get_mut(&pin) {
            Some(p) if p.opened && p.output => {
                p.level = level;
                p.written.push(level);
                Ok(())
            }
            Some(p) if p.opened => Err(HardwareError::WriteFailed { pin, reason: "pin is an input".into() }),
            _ => Err(HardwareError::NotOpened(pin)),
        }
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.slept_ms += ms;
        if self.realtime {
            std::thread::sleep(Duration::from_millis(ms));
        }
    }
}

// ───────────────────────────────────────────────────────────────
// embedded-hal bridge
// ───────────────────────────────────────────────────────────────

/// [`HardwareError`] wrapped for `embedded-hal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioPinError(pub HardwareError);

impl digital::Error for GpioPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One output line of a [`GpioPort`], usable as an `embedded-hal` pin.
pub struct GpioOutputPin<G> {
    gpio: G,
    pin: u8,
}

impl<G: GpioPort> GpioOutputPin<G> {
    /// Open `pin` on `gpio` as an output driven to `initial`.
    pub fn open(mut gpio: G, pin: u8, initial: Level) -> Result<Self, HardwareError> {
        gpio.open_output(pin, initial)?;
        Ok(Self { gpio, pin })
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn port(&self) -> &G {
        &self.gpio
    }
}

impl<G> ErrorType for GpioOutputPin<G> {
    type Error = GpioPinError;
}

impl<G: GpioPort> OutputPin for GpioOutputPin<G> {
    fn set_low(&mut self) -> Result<(), GpioPinError> {
        self.gpio.write(self.pin, Level::Low).map_err(GpioPinError)
    }

    fn set_high(&mut self) -> Result<(), GpioPinError> {
        self.gpio.write(self.pin, Level::High).map_err(GpioPinError)
    }
}
