//! Raspberry Pi 40-pin header map.
//!
//! Config files number pins by **physical header position** (1–40), the way
//! they are counted on the board.  The kernel GPIO interface wants BCM line
//! numbers.  This module is the single place that translates between them.
//!
//! Power, ground, and the ID EEPROM pair (27/28) have no usable line.

use crate::error::HardwareError;

/// Highest physical header position.
pub const HEADER_PINS: u8 = 40;

// ---------------------------------------------------------------------------
// Physical position → BCM line
// ---------------------------------------------------------------------------

/// Index = physical position.  `None` = power, ground, reserved, or off-header.
const BCM_BY_HEADER: [Option<u8>; HEADER_PINS as usize + 1] = [
    None,     // 0   (no such pin)
    None,     // 1   3V3
    None,     // 2   5V
    Some(2),  // 3   SDA1
    None,     // 4   5V
    Some(3),  // 5   SCL1
    None,     // 6   GND
    Some(4),  // 7
    Some(14), // 8   TXD
    None,     // 9   GND
    Some(15), // 10  RXD
    Some(17), // 11
    Some(18), // 12
    Some(27), // 13
    None,     // 14  GND
    Some(22), // 15
    Some(23), // 16
    None,     // 17  3V3
    Some(24), // 18
    Some(10), // 19  MOSI
    None,     // 20  GND
    Some(9),  // 21  MISO
    Some(25), // 22
    Some(11), // 23  SCLK
    Some(8),  // 24  CE0
    None,     // 25  GND
    Some(7),  // 26  CE1
    None,     // 27  ID_SD
    None,     // 28  ID_SC
    Some(5),  // 29
    None,     // 30  GND
    Some(6),  // 31
    Some(12), // 32
    Some(13), // 33
    None,     // 34  GND
    Some(19), // 35
    Some(16), // 36
    Some(26), // 37
    Some(20), // 38
    None,     // 39  GND
    Some(21), // 40
];

/// BCM line behind physical header position `pin`, if it is a GPIO.
pub fn bcm_line(pin: u8) -> Option<u8> {
    BCM_BY_HEADER.get(pin as usize).copied().flatten()
}

/// Like [`bcm_line`], but as a [`HardwareError`] for adapters.
pub fn require_bcm_line(pin: u8) -> Result<u8, HardwareError> {
    bcm_line(pin).ok_or(HardwareError::NotAGpio(pin))
}
