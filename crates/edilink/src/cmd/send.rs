use std::fs;

use edilink_frame::ReceiveMode;
use edilink_session::{connect_with_config, TracingLog};

use crate::cmd::SendArgs;
use crate::exit::{io_error, session_error, CliResult, SUCCESS};
use crate::output::{print_received, print_status, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let config = args.connect.session_config(ReceiveMode::Chunked)?;

    let mut session = connect_with_config(&args.connect.addr, config, TracingLog::handle())
        .map_err(|err| session_error("connect failed", err))?;
    let peer = session.peer().to_string();

    let status = session
        .send_bytes(&payload)
        .map_err(|err| session_error("send failed", err))?;
    print_status(&status, &peer, format);

    if args.wait {
        match session.recv() {
            Ok(received) => print_received(&received, &peer, format),
            Err(err) if err.is_end_of_session() => print_status(&err.status(), &peer, format),
            Err(err) => return Err(session_error("receive failed", err)),
        }
    }

    let closed = session
        .disconnect()
        .map_err(|err| session_error("disconnect failed", err))?;
    print_status(&closed, &peer, format);

    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}
