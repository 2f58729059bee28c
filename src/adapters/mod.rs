//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements     | Connects to                     |
//! |----------------|----------------|---------------------------------|
//! | `gpio`         | GpioPort       | Linux sysfs GPIO / in-memory    |
//! |                | OutputPin      | (embedded-hal bridge for LED)   |
//! | `http_gateway` | GatewayClient  | Remote gateway over HTTP(S)     |
//! | `log_sink`     | EventSink      | `log` facade                    |
//! | `time`         | TimePort       | std monotonic + wall clock      |

pub mod gpio;
pub mod http_gateway;
pub mod log_sink;
pub mod time;
