use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::cmd::{interrupt_flag, open_widget, FlickerArgs};
use crate::exit::{widget_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: FlickerArgs) -> CliResult<i32> {
    let steps = parse_steps(&args.steps)?;
    let running = interrupt_flag()?;

    let mut widget = open_widget(&args.port, &args.deadline)?;
    widget
        .get_parameters()
        .map_err(|err| widget_error("parameter query failed", err))?;

    info!(channel = args.channel, steps = steps.len(), "flicker running; Ctrl-C to stop");
    let mut cycles = 0usize;
    'sequence: loop {
        if let Some(limit) = args.repeat {
            if cycles >= limit {
                break;
            }
        }
        for &(value, hold) in &steps {
            if !running.load(Ordering::SeqCst) {
                break 'sequence;
            }
            widget
                .set_channels(&[(args.channel, value)])
                .map_err(|err| widget_error("output failed", err))?;
            thread::sleep(hold);
        }
        cycles += 1;
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

fn parse_steps(raw: &[String]) -> CliResult<Vec<(u8, Duration)>> {
    if raw.is_empty() {
        return Err(CliError::new(USAGE, "--steps must name at least one VAL:MS pair"));
    }
    raw.iter()
        .map(|step| {
            let (value, hold) = step.split_once(':').ok_or_else(|| {
                CliError::new(USAGE, format!("expected VAL:MS, got: {step}"))
            })?;
            let value: u8 = value
                .parse()
                .map_err(|_| CliError::new(USAGE, format!("invalid intensity: {value}")))?;
            let hold: u64 = hold
                .parse()
                .map_err(|_| CliError::new(USAGE, format!("invalid hold time: {hold}")))?;
            Ok((value, Duration::from_millis(hold)))
        })
        .collect()
}
