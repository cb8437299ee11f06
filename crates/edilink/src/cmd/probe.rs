use edilink_frame::ReceiveMode;
use edilink_session::{connect_with_config, TracingLog};
use serde::Serialize;

use crate::cmd::ProbeArgs;
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

const PREVIEW_LEN: usize = 32;

#[derive(Debug, Serialize)]
struct ProbeOutput {
    peer: String,
    connect_code: i32,
    connect: String,
    reply_size: usize,
    reply_preview: String,
    teardown_code: i32,
    teardown: String,
}

pub fn run(args: ProbeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.connect.session_config(ReceiveMode::Chunked)?;
    let session = connect_with_config(&args.connect.addr, config, TracingLog::handle())
        .map_err(|err| session_error("connect failed", err))?;

    let peer = session.peer().to_string();
    let connected = session.connect_status().clone();
    let reply = session.handshake_reply().to_vec();
    let closed = session
        .disconnect()
        .map_err(|err| session_error("disconnect failed", err))?;

    let out = ProbeOutput {
        peer,
        connect_code: connected.code(),
        connect: connected.message().to_string(),
        reply_size: reply.len(),
        reply_preview: preview(&reply),
        teardown_code: closed.code(),
        teardown: closed.message().to_string(),
    };
    print_probe(&out, format);

    Ok(SUCCESS)
}

fn preview(reply: &[u8]) -> String {
    let end = reply.len().min(PREVIEW_LEN);
    String::from_utf8_lossy(&reply[..end])
        .chars()
        .map(|c| if c.is_control() { '.' } else { c })
        .collect()
}

fn print_probe(out: &ProbeOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("peer: {}", out.peer);
            println!("connect: {} (code {})", out.connect, out.connect_code);
            println!("reply_size: {}", out.reply_size);
            println!("reply_preview: {}", out.reply_preview);
            println!("teardown: {} (code {})", out.teardown, out.teardown_code);
        }
        OutputFormat::Raw => println!("{}", out.peer),
    }
}
