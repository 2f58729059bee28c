//! Application core: pure domain logic, zero I/O.
//!
//! Port traits in [`ports`], the events the scheduler reports through them,
//! and the payload the gateway ingests.  Hardware and network access happen
//! only behind the ports, keeping this layer testable without a Pi attached.

pub mod events;
pub mod payload;
pub mod ports;
