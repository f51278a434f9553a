use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use dmxlink_widget::{DmxWidget, ExchangeConfig};

use crate::exit::{widget_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod blackout;
pub mod channels;
pub mod flicker;
pub mod info;
pub mod ports;
pub mod set;
pub mod sine;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports visible to the host.
    Ports(PortsArgs),
    /// Query widget parameters and identity.
    Info(InfoArgs),
    /// Set widget timing parameters (set-then-verify).
    Set(SetArgs),
    /// Output a universe built from CH=VAL assignments.
    Channels(ChannelsArgs),
    /// Output an all-zero universe, then stop.
    Blackout(BlackoutArgs),
    /// Modulate one channel with a sine wave until interrupted.
    Sine(SineArgs),
    /// Run a stepped flicker sequence on one channel until interrupted.
    Flicker(FlickerArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports(args) => ports::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Set(args) => set::run(args, format),
        Command::Channels(args) => channels::run(args),
        Command::Blackout(args) => blackout::run(args),
        Command::Sine(args) => sine::run(args),
        Command::Flicker(args) => flicker::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Serial port of the widget.
    pub port: String,
    /// Maximum time to wait for each reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub deadline: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Serial port of the widget.
    pub port: String,
    /// Break time in 10.67 µs ticks (9..=127).
    #[arg(long)]
    pub break_time: Option<u8>,
    /// Mark-after-break time in 10.67 µs ticks (1..=127).
    #[arg(long)]
    pub mark_after_break: Option<u8>,
    /// Output rate in packets per second (1..=40).
    #[arg(long)]
    pub rate: Option<u8>,
    /// Maximum time to wait for each reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub deadline: String,
}

#[derive(Args, Debug)]
pub struct ChannelsArgs {
    /// Serial port of the widget.
    pub port: String,
    /// Channel assignments as CH=VAL pairs (channels 1..=512).
    #[arg(required = true)]
    pub assignments: Vec<String>,
    /// Maximum time to wait for each reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub deadline: String,
}

#[derive(Args, Debug)]
pub struct BlackoutArgs {
    /// Serial port of the widget.
    pub port: String,
    /// Maximum time to wait for each reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub deadline: String,
}

#[derive(Args, Debug)]
pub struct SineArgs {
    /// Serial port of the widget.
    pub port: String,
    /// Channel to modulate (1..=512).
    #[arg(long, short = 'c')]
    pub channel: u16,
    /// Wave period (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub period: String,
    /// Lowest intensity of the wave.
    #[arg(long, default_value = "0")]
    pub floor: u8,
    /// Highest intensity of the wave.
    #[arg(long, default_value = "255")]
    pub ceiling: u8,
    /// Stop after this long instead of waiting for Ctrl-C.
    #[arg(long)]
    pub duration: Option<String>,
    /// Maximum time to wait for each reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub deadline: String,
}

#[derive(Args, Debug)]
pub struct FlickerArgs {
    /// Serial port of the widget.
    pub port: String,
    /// Channel to flicker (1..=512).
    #[arg(long, short = 'c')]
    pub channel: u16,
    /// Sequence steps as VAL:MS pairs (comma-separated).
    #[arg(long, value_delimiter = ',', default_value = "255:40,0:60,180:30,0:120")]
    pub steps: Vec<String>,
    /// Number of times to run the sequence; loops until Ctrl-C if omitted.
    #[arg(long)]
    pub repeat: Option<usize>,
    /// Maximum time to wait for each reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub deadline: String,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}

/// Open a widget session with the reply deadline every CLI command carries.
///
/// The core's default is an unbounded reply wait; a CLI invocation should
/// fail rather than hang, so a deadline is always set here.
pub fn open_widget(port: &str, deadline: &str) -> CliResult<DmxWidget> {
    let deadline = parse_duration(deadline)?;
    let config = ExchangeConfig {
        reply_deadline: Some(deadline),
        ..ExchangeConfig::default()
    };
    DmxWidget::open_with_config(port, config).map_err(|err| widget_error("open failed", err))
}

/// Install a Ctrl-C handler and return the flag it clears.
pub fn interrupt_flag() -> CliResult<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)).map_err(|err| {
        CliError::new(
            INTERNAL,
            format!("failed to install interrupt handler: {err}"),
        )
    })?;
    Ok(running)
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}
