//! Status indicator: pure animations, the async LED executor, and its thread.

pub mod indicator_task;
pub mod led_patterns;
pub mod status_led;
