//! laundry-telemetry main entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SysfsGpio / SimGpio   HttpGateway     SystemTimeAdapter       │
//! │  (GpioPort)            (GatewayClient) (TimePort)              │
//! │  LogEventSink          ChannelBlinkTrigger                     │
//! │  (EventSink)           (BlinkTrigger)                          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   PublishScheduler (main thread, fixed-delay loop)     │    │
//! │  │   debounce · payload build · publish                   │    │
//! │  └──────────────────────────┬─────────────────────────────┘    │
//! │                             │ BLINK_CHANNEL                    │
//! │  ┌──────────────────────────▼─────────────────────────────┐    │
//! │  │   StatusLed (indicator thread, edge-executor)          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use laundry_telemetry::adapters::gpio::{GpioOutputPin, SimGpio};
use laundry_telemetry::adapters::http_gateway::HttpGateway;
use laundry_telemetry::adapters::log_sink::LogEventSink;
use laundry_telemetry::adapters::time::SystemTimeAdapter;
use laundry_telemetry::app::ports::{GpioPort, Level};
use laundry_telemetry::channels::{BLINK_CHANNEL, BLINK_DEPTH, ChannelBlinkTrigger};
use laundry_telemetry::config::AgentConfig;
use laundry_telemetry::drivers::indicator_task;
use laundry_telemetry::drivers::led_patterns::{BlinkBurst, StartupAnimation, total_wait_ms};
use laundry_telemetry::scheduler::{CycleOutcome, PublishScheduler};
use laundry_telemetry::sensors;

/// Samples laundry machine sensors and publishes their state to a gateway.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Stop after this many cycles instead of running forever.  The last
    /// blink burst is allowed to finish before exiting.
    #[arg(long)]
    cycles: Option<usize>,

    /// Build payloads and log them, but never contact the gateway
    #[arg(long)]
    dry_run: bool,

    /// Use in-memory GPIO instead of /sys/class/gpio
    #[arg(long)]
    simulate: bool,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "laundry_telemetry=trace"
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(level: Option<&str>) {
    let mut builder = match level {
        Some(filters) => {
            let mut b = env_logger::Builder::new();
            b.parse_filters(filters);
            b
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")),
    };
    builder.format_timestamp_millis().init();
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    info!("laundry-telemetry v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Config ─────────────────────────────────────────────
    let mut config = AgentConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if cli.dry_run {
        config.publishing = false;
    }
    info!("Config: {}", config.redacted());

    // ── 2. GPIO backend ───────────────────────────────────────
    if cli.simulate {
        info!("GPIO: simulated");
        run_agent(&config, SimGpio::realtime(), SimGpio::new(), cli.cycles)
    } else {
        run_hardware(&config, cli.cycles)
    }
}

#[cfg(target_os = "linux")]
fn run_hardware(config: &AgentConfig, cycles: Option<usize>) -> Result<()> {
    use laundry_telemetry::adapters::gpio::SysfsGpio;
    info!("GPIO: sysfs");
    run_agent(config, SysfsGpio::new(), SysfsGpio::new(), cycles)
}

#[cfg(not(target_os = "linux"))]
fn run_hardware(_config: &AgentConfig, _cycles: Option<usize>) -> Result<()> {
    anyhow::bail!("sysfs GPIO needs Linux; run with --simulate")
}

fn run_agent<G>(config: &AgentConfig, mut gpio: G, led_gpio: G, cycles: Option<usize>) -> Result<()>
where
    G: GpioPort + Send + 'static,
{
    // ── 3. Pins ───────────────────────────────────────────────
    sensors::init_sensors(&mut gpio, &config.sensors).context("opening sensor pins")?;
    let led = GpioOutputPin::open(led_gpio, config.indicator_pin, Level::Low)
        .with_context(|| format!("opening indicator pin {}", config.indicator_pin))?;

    // ── 4. Indicator thread ───────────────────────────────────
    indicator_task::spawn(led, config.indicator).context("spawning indicator thread")?;

    // ── 5. Gateway + scheduler ────────────────────────────────
    let gateway = HttpGateway::new(
        &config.gateway,
        &config.api_key,
        Duration::from_millis(config.gateway_timeout_ms),
    )
    .context("building gateway client")?;
    info!("Gateway: {}", gateway.url());

    let mut scheduler = PublishScheduler::new(
        config,
        gpio,
        gateway,
        SystemTimeAdapter::new(),
        ChannelBlinkTrigger::global(),
        LogEventSink::new(),
    );

    // ── 6. Publish loop ───────────────────────────────────────
    match cycles {
        Some(n) => {
            let outcomes = scheduler.run_cycles(n);
            let last_burst = outcomes.iter().rev().find_map(|o| match o {
                CycleOutcome::Completed { active, .. } => Some(*active),
                _ => None,
            });
            if let Some(count) = last_burst {
                drain_indicator(config, count);
            }
            let stats = scheduler.stats();
            info!(
                "Done: {} completed, {} aborted, {} publish failure(s)",
                stats.cycles_completed, stats.cycles_aborted, stats.publish_failures
            );
            Ok(())
        }
        None => scheduler.run(),
    }
}

/// Wait until the indicator has taken every queued burst, then for the last
/// one (`count` blinks) to play out.
fn drain_indicator(config: &AgentConfig, count: usize) {
    let ind = &config.indicator;
    let longest = Duration::from_millis(total_wait_ms(BlinkBurst::new(config.sensors.len(), ind)));
    let deadline = Instant::now()
        + Duration::from_millis(total_wait_ms(StartupAnimation::new(ind)))
        + longest * (BLINK_DEPTH as u32 + 1);
    while !BLINK_CHANNEL.is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    thread::sleep(Duration::from_millis(total_wait_ms(BlinkBurst::new(count, ind))));
}
