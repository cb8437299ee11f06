use std::fmt;

use serde::Serialize;

/// Numeric outcome codes carried by [`Status`].
pub mod code {
    /// The only success code.
    pub const OK: i32 = 0;
    /// Address resolution failed; also the generic transfer failure code.
    pub const TRANSFER_FAILED: i32 = 1;
    /// The stream could not be opened.
    pub const CONNECT_FAILED: i32 = 2;
    /// The host answered a frame with something other than the ACK byte.
    pub const DESYNC: i32 = 2;
    /// Writing the handshake token failed.
    pub const TOKEN_WRITE_FAILED: i32 = 3;
    /// Reading the handshake response failed.
    pub const REPLY_READ_FAILED: i32 = 4;
    /// Writing the handshake acknowledgment failed.
    pub const HANDSHAKE_ACK_FAILED: i32 = 5;
    /// The operation is not allowed in the session's current state.
    pub const INVALID_STATE: i32 = 6;
    /// The payload does not fit in a frame.
    pub const PAYLOAD_TOO_LARGE: i32 = 7;
    /// The host sent a negative frame length.
    pub const END_OF_SESSION: i32 = -9999;
}

/// Names of the protocol steps a [`Status`] can report on.
pub mod op {
    pub const RESOLVE: &str = "connect.resolve";
    pub const DIAL: &str = "connect.dial";
    pub const WRITE_TOKEN: &str = "connect.write_token";
    pub const READ_REPLY: &str = "connect.read_reply";
    pub const WRITE_HANDSHAKE_ACK: &str = "connect.write_ack";
    pub const CONNECT: &str = "connect";

    pub const RECV: &str = "recv";
    pub const READ_LENGTH: &str = "recv.read_length";
    pub const END_OF_SESSION: &str = "recv.end_of_session";
    pub const READ_PAYLOAD: &str = "recv.read_payload";
    pub const SEND_ACK: &str = "recv.send_ack";

    pub const SEND: &str = "send";
    pub const FRAME_LENGTH: &str = "send.frame_length";
    pub const WRITE_LENGTH: &str = "send.write_length";
    pub const WRITE_PAYLOAD: &str = "send.write_payload";
    pub const SHORT_WRITE: &str = "send.short_write";
    pub const READ_ACK: &str = "send.read_ack";

    pub const DISCONNECT: &str = "disconnect";
    pub const WRITE_SENTINEL: &str = "disconnect.write_sentinel";
}

/// Outcome of a session operation.
///
/// Immutable once built. A zero code is the only success state;
/// [`code::END_OF_SESSION`] marks the host's end-of-session signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    op: &'static str,
    code: i32,
    message: String,
    len: i32,
}

impl Status {
    pub fn new(op: &'static str, code: i32, message: impl Into<String>, len: i32) -> Self {
        Self {
            op,
            code,
            message: message.into(),
            len,
        }
    }

    /// A success status.
    pub fn ok(op: &'static str, message: impl Into<String>, len: i32) -> Self {
        Self::new(op, code::OK, message, len)
    }

    /// The protocol step this status describes.
    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Last observed frame length.
    pub fn len(&self) -> i32 {
        self.len
    }

    pub fn is_ok(&self) -> bool {
        self.code == code::OK
    }

    pub fn is_end_of_session(&self) -> bool {
        self.code == code::END_OF_SESSION
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (code {}, len {})",
            self.op, self.message, self.code, self.len
        )
    }
}
