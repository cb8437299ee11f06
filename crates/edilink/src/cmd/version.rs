use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("edilink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: edilink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("EDILINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("frame: i16 big-endian length, max {}", edilink_frame::MAX_FRAME_LEN);
    println!(
        "session_end: {} ({:#06x})",
        edilink_frame::SESSION_END,
        edilink_frame::SESSION_END as u16
    );

    Ok(SUCCESS)
}
