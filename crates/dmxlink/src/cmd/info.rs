use crate::cmd::{open_widget, InfoArgs};
use crate::exit::{widget_error, CliResult, SUCCESS};
use crate::output::{print_info, OutputFormat};

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut widget = open_widget(&args.port, &args.deadline)?;

    let params = widget
        .get_parameters()
        .map_err(|err| widget_error("parameter query failed", err))?
        .clone();
    let identity = widget
        .query_identity()
        .map_err(|err| widget_error("identity query failed", err))?;

    print_info(&args.port, &params, &identity, format);
    Ok(SUCCESS)
}
