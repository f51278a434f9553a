use crate::cmd::{open_widget, BlackoutArgs};
use crate::exit::{widget_error, CliResult, SUCCESS};

pub fn run(args: BlackoutArgs) -> CliResult<i32> {
    let mut widget = open_widget(&args.port, &args.deadline)?;
    widget
        .get_parameters()
        .map_err(|err| widget_error("parameter query failed", err))?;

    // Stopping alone does not extinguish fixtures; the all-zero universe
    // does, and the stop leaves the link idle afterwards.
    widget
        .set_channels(&[])
        .map_err(|err| widget_error("blackout failed", err))?;
    widget
        .stop_output()
        .map_err(|err| widget_error("stop failed", err))?;
    Ok(SUCCESS)
}
