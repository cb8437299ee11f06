//! Length-prefixed framing for the EDI host link.
//!
//! Every message on the wire is:
//! - A 2-byte big-endian signed payload length
//! - Exactly that many payload bytes
//!
//! A negative length carries no payload and signals end of session. After
//! each payload frame the receiver answers with a single acknowledgment byte.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_length, encode_frame, encode_length, frame_length, Frame, FrameConfig,
    ReceiveMode, ACK, DEFAULT_READ_CHUNK, LENGTH_SIZE, MAX_FRAME_LEN, SESSION_END,
};
pub use error::{FrameError, Result};
pub use reader::{read_ack, read_length, read_payload};
pub use writer::{write_ack, write_length, write_payload};
