use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Length field: 2 bytes, big-endian, signed.
pub const LENGTH_SIZE: usize = 2;

/// Declared length that announces the end of a session.
pub const SESSION_END: i16 = -9999;

/// Largest payload a length field can describe.
pub const MAX_FRAME_LEN: usize = i16::MAX as usize;

/// Acknowledgment byte sent after the handshake and after every payload frame.
pub const ACK: u8 = b'Y';

/// Default size of each payload read request.
pub const DEFAULT_READ_CHUNK: usize = 4096;

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Declared length. Negative for the end-of-session sentinel.
    pub len: i16,
    /// The payload. Always empty for a negative length.
    pub payload: Bytes,
}

impl Frame {
    /// Create a payload frame, checking that the payload fits a length field.
    pub fn new(payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        let len = frame_length(&payload)?;
        Ok(Self { len, payload })
    }

    /// The end-of-session sentinel frame.
    pub fn session_end() -> Self {
        Self {
            len: SESSION_END,
            payload: Bytes::new(),
        }
    }

    /// The total wire size of this frame (length field + payload).
    pub fn wire_size(&self) -> usize {
        LENGTH_SIZE + self.payload.len()
    }
}

/// How the payload read loop sizes its read requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiveMode {
    /// Request a full chunk on every read and keep whatever arrives, even
    /// bytes past the declared length. Matches existing host behaviour.
    #[default]
    Chunked,
    /// Never request more than the bytes still owed by the current frame.
    Exact,
}

/// Configuration for the payload reader.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Size of each read request. Default: 4096 bytes.
    pub read_chunk_size: usize,
    /// Read loop policy. Default: [`ReceiveMode::Chunked`].
    pub receive_mode: ReceiveMode,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK,
            receive_mode: ReceiveMode::default(),
        }
    }
}

/// The length field value for a payload.
pub fn frame_length(payload: &[u8]) -> Result<i16> {
    i16::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        max: MAX_FRAME_LEN,
    })
}

/// Append a big-endian length field.
pub fn encode_length(len: i16, dst: &mut BytesMut) {
    dst.reserve(LENGTH_SIZE);
    dst.put_i16(len);
}

/// Interpret a length field.
pub fn decode_length(src: [u8; LENGTH_SIZE]) -> i16 {
    i16::from_be_bytes(src)
}

/// Encode a frame into the wire format.
///
/// ```text
/// ┌──────────────┬──────────────────┐
/// │ Length (2B)  │ Payload          │
/// │ i16 BE       │ (Length bytes)   │
/// └──────────────┴──────────────────┘
/// ```
///
/// The sentinel frame encodes to its length field alone.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(frame.wire_size());
    encode_length(frame.len, dst);
    dst.put_slice(&frame.payload);
}
