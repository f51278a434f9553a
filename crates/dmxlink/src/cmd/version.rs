use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if args.extended {
        println!(
            "dmxlink {} ({})",
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_REPOSITORY")
        );
    } else {
        println!("dmxlink {}", env!("CARGO_PKG_VERSION"));
    }
    Ok(SUCCESS)
}
