use crate::cmd::{open_widget, SetArgs};
use crate::exit::{widget_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_info, OutputFormat};

pub fn run(args: SetArgs, format: OutputFormat) -> CliResult<i32> {
    if args.break_time.is_none() && args.mark_after_break.is_none() && args.rate.is_none() {
        return Err(CliError::new(
            USAGE,
            "nothing to set: pass at least one of --break-time, --mark-after-break, --rate",
        ));
    }

    let mut widget = open_widget(&args.port, &args.deadline)?;

    // Start from the device's current record so unspecified fields and the
    // user configuration blob ride along unchanged.
    let mut next = widget
        .get_parameters()
        .map_err(|err| widget_error("parameter query failed", err))?
        .clone();
    if let Some(value) = args.break_time {
        next.break_time = value;
    }
    if let Some(value) = args.mark_after_break {
        next.mark_after_break_time = value;
    }
    if let Some(value) = args.rate {
        next.output_rate = value;
    }

    widget
        .set_parameters(next)
        .map_err(|err| widget_error("parameter set failed", err))?;

    let identity = widget
        .query_identity()
        .map_err(|err| widget_error("identity query failed", err))?;
    print_info(&args.port, widget.parameters(), &identity, format);
    Ok(SUCCESS)
}
