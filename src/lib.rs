//! laundry-telemetry library.
//!
//! Exposes the agent's modules for the binary, integration tests, and the
//! fuzz targets.  Hardware-specific adapters are guarded by
//! `#[cfg(target_os = "linux")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod channels;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod scheduler;
pub mod sensors;
