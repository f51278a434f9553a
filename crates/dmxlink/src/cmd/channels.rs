use crate::cmd::{open_widget, ChannelsArgs};
use crate::exit::{widget_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: ChannelsArgs) -> CliResult<i32> {
    let assignments = parse_assignments(&args.assignments)?;

    let mut widget = open_widget(&args.port, &args.deadline)?;
    widget
        .get_parameters()
        .map_err(|err| widget_error("parameter query failed", err))?;

    widget
        .set_channels(&assignments)
        .map_err(|err| widget_error("output failed", err))?;
    // The widget holds the last frame on the DMX line after we stop
    // refreshing it, so the levels persist past process exit.
    widget
        .stop_output()
        .map_err(|err| widget_error("stop failed", err))?;
    Ok(SUCCESS)
}

pub(crate) fn parse_assignments(raw: &[String]) -> CliResult<Vec<(u16, u8)>> {
    raw.iter()
        .map(|pair| {
            let (channel, value) = pair.split_once('=').ok_or_else(|| {
                CliError::new(USAGE, format!("expected CH=VAL, got: {pair}"))
            })?;
            let channel: u16 = channel
                .parse()
                .map_err(|_| CliError::new(USAGE, format!("invalid channel: {channel}")))?;
            let value: u8 = value
                .parse()
                .map_err(|_| CliError::new(USAGE, format!("invalid value: {value}")))?;
            Ok((channel, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channel_value_pairs() {
        let parsed =
            parse_assignments(&["3=200".to_string(), "512=1".to_string()]).unwrap();
        assert_eq!(parsed, vec![(3, 200), (512, 1)]);
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(parse_assignments(&["3".to_string()]).is_err());
        assert!(parse_assignments(&["x=1".to_string()]).is_err());
        assert!(parse_assignments(&["3=300".to_string()]).is_err());
    }
}
