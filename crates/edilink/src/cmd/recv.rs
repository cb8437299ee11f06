use edilink_frame::ReceiveMode;
use edilink_session::{connect_with_config, TracingLog};

use crate::cmd::RecvArgs;
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_received, print_status, OutputFormat};

pub fn run(args: RecvArgs, format: OutputFormat) -> CliResult<i32> {
    let mode = if args.exact {
        ReceiveMode::Exact
    } else {
        ReceiveMode::Chunked
    };
    let config = args.connect.session_config(mode)?;

    let mut session = connect_with_config(&args.connect.addr, config, TracingLog::handle())
        .map_err(|err| session_error("connect failed", err))?;
    let peer = session.peer().to_string();

    let mut received = 0usize;
    while args.count.is_none_or(|limit| received < limit) {
        match session.recv() {
            Ok(frame) => {
                print_received(&frame, &peer, format);
                received += 1;
            }
            Err(err) if err.is_end_of_session() => {
                print_status(&err.status(), &peer, format);
                break;
            }
            Err(err) => return Err(session_error("receive failed", err)),
        }
    }

    let closed = session
        .disconnect()
        .map_err(|err| session_error("disconnect failed", err))?;
    print_status(&closed, &peer, format);

    Ok(SUCCESS)
}
