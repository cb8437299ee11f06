use std::fmt;
use std::io;

use edilink_frame::FrameError;
use edilink_session::SessionError;
use edilink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DESYNC: i32 = 2;
pub const CONNECT_FAILED: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(&err, INTERNAL), format!("{context}: {err}"))
}

fn io_code(err: &io::Error, fallback: i32) -> i32 {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => fallback,
    }
}

fn frame_code(err: &FrameError, fallback: i32) -> i32 {
    match err {
        FrameError::Io(source) => io_code(source, fallback),
        _ => fallback,
    }
}

fn transport_code(err: &TransportError) -> i32 {
    io_code(err.io_error(), CONNECT_FAILED)
}

/// Map a session failure to a process exit code, keeping the protocol
/// status text in the message.
pub fn session_error(context: &str, err: SessionError) -> CliError {
    let code = match &err {
        SessionError::Resolve(source) | SessionError::Connect(source) => transport_code(source),
        SessionError::Handshake { source, .. } => frame_code(source, CONNECT_FAILED),
        SessionError::AckMismatch { .. } => DESYNC,
        SessionError::PayloadTooLarge(_) => DATA_INVALID,
        SessionError::InvalidState { .. } => INTERNAL,
        SessionError::EndOfSession { .. } | SessionError::ShortWrite { .. } => FAILURE,
        SessionError::ReadLength(source)
        | SessionError::ReadPayload(source)
        | SessionError::SendAck(source)
        | SessionError::WriteLength(source)
        | SessionError::WritePayload(source)
        | SessionError::ReadAck(source)
        | SessionError::WriteSentinel(source) => frame_code(source, FAILURE),
    };
    CliError::new(code, format!("{context}: {}", err.status()))
}
