use std::fmt;
use std::io::{ErrorKind, Read, Write};

use bytes::Bytes;
use edilink_frame::{write_ack, FrameError, ACK};

use crate::error::{Result, SessionError};
use crate::status::{code, op};

/// Security token the host expects as the first bytes of every session.
pub const DEFAULT_TOKEN: &str = "123456789012345678901234567890123456789012345678901234567890";

/// Upper bound on the handshake response read.
pub const DEFAULT_REPLY_CAPACITY: usize = 1024;

/// The handshake steps, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    WriteToken,
    ReadReply,
    WriteAck,
}

impl HandshakeStep {
    pub fn op(self) -> &'static str {
        match self {
            HandshakeStep::WriteToken => op::WRITE_TOKEN,
            HandshakeStep::ReadReply => op::READ_REPLY,
            HandshakeStep::WriteAck => op::WRITE_HANDSHAKE_ACK,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            HandshakeStep::WriteToken => code::TOKEN_WRITE_FAILED,
            HandshakeStep::ReadReply => code::REPLY_READ_FAILED,
            HandshakeStep::WriteAck => code::HANDSHAKE_ACK_FAILED,
        }
    }
}

impl fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandshakeStep::WriteToken => "token write",
            HandshakeStep::ReadReply => "response read",
            HandshakeStep::WriteAck => "acknowledgment write",
        })
    }
}

/// Configuration for the security handshake.
#[derive(Clone)]
pub struct HandshakeConfig {
    /// Token written verbatim, without a length prefix.
    /// Treated as credential material and redacted in debug output.
    pub token: String,
    /// Maximum number of response bytes read.
    pub reply_capacity: usize,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN.to_string(),
            reply_capacity: DEFAULT_REPLY_CAPACITY,
        }
    }
}

impl fmt::Debug for HandshakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandshakeConfig")
            .field(
                "token",
                &format_args!("<redacted:{} bytes>", self.token.len()),
            )
            .field("reply_capacity", &self.reply_capacity)
            .finish()
    }
}

/// Result of a completed handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResult {
    /// The host's response. Not interpreted; kept for diagnostics.
    pub reply: Bytes,
}

/// Perform the client side of the security handshake.
///
/// Writes the token, reads one response of up to `reply_capacity` bytes,
/// then writes the ACK byte. The response content is not inspected: any
/// read that returns data passes. Nothing is retried.
pub fn handshake_client<S: Read + Write>(
    stream: &mut S,
    config: &HandshakeConfig,
) -> Result<HandshakeResult> {
    stream
        .write_all(config.token.as_bytes())
        .and_then(|()| stream.flush())
        .map_err(|e| failed(HandshakeStep::WriteToken, FrameError::Io(e)))?;

    let mut reply = vec![0u8; config.reply_capacity.max(1)];
    let read = loop {
        match stream.read(&mut reply) {
            Ok(0) => return Err(failed(HandshakeStep::ReadReply, FrameError::ConnectionClosed)),
            Ok(n) => break n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(failed(HandshakeStep::ReadReply, FrameError::Io(err))),
        }
    };
    reply.truncate(read);

    write_ack(stream, ACK).map_err(|e| failed(HandshakeStep::WriteAck, e))?;

    Ok(HandshakeResult {
        reply: Bytes::from(reply),
    })
}

fn failed(step: HandshakeStep, source: FrameError) -> SessionError {
    SessionError::Handshake { step, source }
}
