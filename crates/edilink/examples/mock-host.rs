//! Stand-in EDI host for trying the client without a real mainframe.
//!
//! Run with:
//!   cargo run --example mock-host -- 127.0.0.1:30001 echo
//!   cargo run --example mock-host -- 127.0.0.1:30001 push "ISA*00*" "IEA*1*"
//!
//! In another terminal:
//!   cargo run --features cli -- send 127.0.0.1:30001 --data HELLO --wait
//!   cargo run --features cli -- recv 127.0.0.1:30001
//!
//! `echo` acknowledges each frame and sends it back. `push` sends the given
//! frames followed by the end-of-session sentinel. Both answer the client's
//! teardown. Sessions are served one at a time.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use bytes::BytesMut;
use edilink::frame::{
    encode_frame, read_ack, read_length, read_payload, write_ack, Frame, FrameConfig,
    ReceiveMode, ACK,
};
use edilink::session::DEFAULT_TOKEN;

enum Mode {
    Echo,
    Push(Vec<String>),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1:30001".to_string());
    let mode = match args.next().as_deref() {
        None | Some("echo") => Mode::Echo,
        Some("push") => Mode::Push(args.collect()),
        Some(other) => return Err(format!("unknown mode: {other}").into()),
    };

    let listener = TcpListener::bind(&addr)?;
    eprintln!("Listening on {}", listener.local_addr()?);

    for stream in listener.incoming() {
        let mut stream = stream?;
        let client = stream.peer_addr()?;
        eprintln!("Client connected: {client}");

        match serve(&mut stream, &mode) {
            Ok(()) => eprintln!("Client {client} closed the session"),
            Err(e) => eprintln!("Client {client} dropped: {e}"),
        }
    }

    Ok(())
}

fn serve(stream: &mut TcpStream, mode: &Mode) -> Result<(), Box<dyn std::error::Error>> {
    let mut token = vec![0u8; DEFAULT_TOKEN.len()];
    stream.read_exact(&mut token)?;
    if token != DEFAULT_TOKEN.as_bytes() {
        return Err("bad security token".into());
    }
    stream.write_all(b"PASS")?;
    expect_ack(stream)?;

    if let Mode::Push(frames) = mode {
        for payload in frames {
            send_frame(stream, &Frame::new(payload.clone())?)?;
            expect_ack(stream)?;
        }
        send_frame(stream, &Frame::session_end())?;
    }

    let config = FrameConfig {
        receive_mode: ReceiveMode::Exact,
        ..FrameConfig::default()
    };

    loop {
        let len = read_length(stream)?;
        if len < 0 {
            // Teardown: answer the sentinel and take the final ack.
            send_frame(stream, &Frame::session_end())?;
            let _ = read_ack(stream);
            return Ok(());
        }

        let payload = read_payload(stream, len as usize, &config)?;
        write_ack(stream, ACK)?;
        eprintln!("Received {} bytes", payload.len());

        if matches!(mode, Mode::Echo) {
            send_frame(stream, &Frame::new(payload.freeze())?)?;
            expect_ack(stream)?;
        }
    }
}

fn send_frame(stream: &mut TcpStream, frame: &Frame) -> std::io::Result<()> {
    let mut wire = BytesMut::with_capacity(frame.wire_size());
    encode_frame(frame, &mut wire);
    stream.write_all(&wire)?;
    stream.flush()
}

fn expect_ack(stream: &mut TcpStream) -> Result<(), Box<dyn std::error::Error>> {
    match read_ack(stream)? {
        ACK => Ok(()),
        other => Err(format!("expected ack, got {other:#04x}").into()),
    }
}
