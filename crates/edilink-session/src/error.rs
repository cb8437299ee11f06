use edilink_frame::{FrameError, SESSION_END};
use edilink_transport::TransportError;

use crate::handshake::HandshakeStep;
use crate::state::SessionState;
use crate::status::{code, op, Status};

/// Errors that can occur in session operations.
///
/// Each variant maps to the step that failed and its numeric code; see
/// [`SessionError::status`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The host address could not be resolved.
    #[error("address resolution failed: {0}")]
    Resolve(#[source] TransportError),

    /// The stream to the host could not be opened.
    #[error("connection open failed: {0}")]
    Connect(#[source] TransportError),

    /// A security handshake step failed.
    #[error("handshake {step} failed: {source}")]
    Handshake {
        step: HandshakeStep,
        #[source]
        source: FrameError,
    },

    /// The inbound frame length could not be read.
    #[error("failed to read frame length: {0}")]
    ReadLength(#[source] FrameError),

    /// The host sent a negative frame length.
    #[error("received negative length {len} (end of session)")]
    EndOfSession { len: i16 },

    /// The inbound payload could not be read.
    #[error("failed to read frame payload: {0}")]
    ReadPayload(#[source] FrameError),

    /// The acknowledgment for a received frame could not be written.
    #[error("failed to send acknowledgment: {0}")]
    SendAck(#[source] FrameError),

    /// The payload does not fit in a frame.
    #[error("cannot frame payload: {0}")]
    PayloadTooLarge(#[source] FrameError),

    /// The outbound frame length could not be written.
    #[error("failed to write frame length: {0}")]
    WriteLength(#[source] FrameError),

    /// The outbound payload could not be written.
    #[error("failed to write frame payload: {0}")]
    WritePayload(#[source] FrameError),

    /// The stream accepted fewer payload bytes than declared.
    #[error("send failed to send all data, expected {expected} but sent {sent}")]
    ShortWrite { expected: usize, sent: usize },

    /// The acknowledgment for a sent frame could not be read.
    #[error("failed to read acknowledgment: {0}")]
    ReadAck(#[source] FrameError),

    /// The host answered with something other than the ACK byte.
    #[error("failed to receive ACK, maybe out of sync (got byte {got:#04x})")]
    AckMismatch { got: u8 },

    /// The session-end sentinel could not be written.
    #[error("failed to write session-end sentinel: {0}")]
    WriteSentinel(#[source] FrameError),

    /// The operation is not legal in the current session state.
    #[error("{op} not allowed while session is {state}")]
    InvalidState {
        op: &'static str,
        state: SessionState,
    },
}

impl SessionError {
    /// The protocol step that failed.
    pub fn op(&self) -> &'static str {
        match self {
            SessionError::Resolve(_) => op::RESOLVE,
            SessionError::Connect(_) => op::DIAL,
            SessionError::Handshake { step, .. } => step.op(),
            SessionError::ReadLength(_) => op::READ_LENGTH,
            SessionError::EndOfSession { .. } => op::END_OF_SESSION,
            SessionError::ReadPayload(_) => op::READ_PAYLOAD,
            SessionError::SendAck(_) => op::SEND_ACK,
            SessionError::PayloadTooLarge(_) => op::FRAME_LENGTH,
            SessionError::WriteLength(_) => op::WRITE_LENGTH,
            SessionError::WritePayload(_) => op::WRITE_PAYLOAD,
            SessionError::ShortWrite { .. } => op::SHORT_WRITE,
            SessionError::ReadAck(_) | SessionError::AckMismatch { .. } => op::READ_ACK,
            SessionError::WriteSentinel(_) => op::WRITE_SENTINEL,
            SessionError::InvalidState { op: attempted, .. } => *attempted,
        }
    }

    /// The numeric status code for this failure. Never zero.
    pub fn code(&self) -> i32 {
        match self {
            SessionError::Resolve(_) => code::TRANSFER_FAILED,
            SessionError::Connect(_) => code::CONNECT_FAILED,
            SessionError::Handshake { step, .. } => step.code(),
            SessionError::EndOfSession { .. } => code::END_OF_SESSION,
            SessionError::AckMismatch { .. } => code::DESYNC,
            SessionError::InvalidState { .. } => code::INVALID_STATE,
            SessionError::PayloadTooLarge(_) => code::PAYLOAD_TOO_LARGE,
            SessionError::ReadLength(_)
            | SessionError::ReadPayload(_)
            | SessionError::SendAck(_)
            | SessionError::WriteLength(_)
            | SessionError::WritePayload(_)
            | SessionError::ShortWrite { .. }
            | SessionError::ReadAck(_)
            | SessionError::WriteSentinel(_) => code::TRANSFER_FAILED,
        }
    }

    /// Frame length observed when the failure happened.
    pub fn len(&self) -> i32 {
        match self {
            SessionError::EndOfSession { len } => i32::from(*len),
            SessionError::WriteSentinel(_) => i32::from(SESSION_END),
            _ => 0,
        }
    }

    /// Whether this is the host's end-of-session signal rather than a fault.
    pub fn is_end_of_session(&self) -> bool {
        matches!(self, SessionError::EndOfSession { .. })
    }

    /// Whether the failure leaves the stream position unknown.
    ///
    /// Rejections that happen before any I/O do not.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SessionError::EndOfSession { .. }
                | SessionError::InvalidState { .. }
                | SessionError::PayloadTooLarge(_)
        )
    }

    /// The status value describing this failure.
    pub fn status(&self) -> Status {
        Status::new(self.op(), self.code(), self.to_string(), self.len())
    }
}

impl From<&SessionError> for Status {
    fn from(err: &SessionError) -> Self {
        err.status()
    }
}

impl From<SessionError> for Status {
    fn from(err: SessionError) -> Self {
        err.status()
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
