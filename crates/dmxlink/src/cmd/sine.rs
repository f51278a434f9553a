use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::cmd::{interrupt_flag, open_widget, parse_duration, SineArgs};
use crate::exit::{widget_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SineArgs) -> CliResult<i32> {
    if args.ceiling < args.floor {
        return Err(CliError::new(
            USAGE,
            format!("--ceiling {} is below --floor {}", args.ceiling, args.floor),
        ));
    }
    let period = parse_duration(&args.period)?;
    let duration = args.duration.as_deref().map(parse_duration).transpose()?;
    let running = interrupt_flag()?;

    let mut widget = open_widget(&args.port, &args.deadline)?;
    // The frame refresh tick follows the device's configured output rate;
    // refreshing faster than the widget re-emits buys nothing.
    let tick = widget
        .get_parameters()
        .map_err(|err| widget_error("parameter query failed", err))?
        .output_period();

    info!(channel = args.channel, "sine modulation running; Ctrl-C to stop");
    let started = Instant::now();
    while running.load(Ordering::SeqCst) {
        if let Some(limit) = duration {
            if started.elapsed() >= limit {
                break;
            }
        }
        let value = wave_value(started.elapsed(), period, args.floor, args.ceiling);
        widget
            .set_channels(&[(args.channel, value)])
            .map_err(|err| widget_error("output failed", err))?;
        thread::sleep(tick);
    }

    // However the loop ended, leave the fixture dark and the link idle.
    widget
        .set_channels(&[(args.channel, 0)])
        .map_err(|err| widget_error("blackout failed", err))?;
    widget
        .stop_output()
        .map_err(|err| widget_error("stop failed", err))?;
    Ok(SUCCESS)
}

fn wave_value(elapsed: Duration, period: Duration, floor: u8, ceiling: u8) -> u8 {
    let phase = elapsed.as_secs_f64() / period.as_secs_f64();
    let wave = (phase * std::f64::consts::TAU).sin();
    let span = f64::from(ceiling - floor);
    floor.saturating_add(((wave + 1.0) / 2.0 * span).round() as u8)
}
