use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{encode_length, LENGTH_SIZE};
use crate::error::{FrameError, Result};

/// Write a frame length field and flush (blocking).
pub fn write_length<W: Write>(writer: &mut W, len: i16) -> Result<()> {
    let mut buf = BytesMut::with_capacity(LENGTH_SIZE);
    encode_length(len, &mut buf);
    write_fully(writer, &buf)?;
    trace!(len, "wrote frame length");
    Ok(())
}

/// Write payload bytes and flush (blocking).
///
/// Returns the number of bytes the stream accepted. A write that accepts
/// zero bytes ends the attempt early, so the count can be short of
/// `payload.len()`; callers compare it against the declared length.
pub fn write_payload<W: Write>(writer: &mut W, payload: &[u8]) -> Result<usize> {
    let mut offset = 0usize;
    while offset < payload.len() {
        match writer.write(&payload[offset..]) {
            Ok(0) => break,
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }

    flush(writer)?;
    trace!(declared = payload.len(), sent = offset, "wrote frame payload");
    Ok(offset)
}

/// Write a single acknowledgment byte and flush (blocking).
pub fn write_ack<W: Write>(writer: &mut W, ack: u8) -> Result<()> {
    write_fully(writer, &[ack])
}

fn write_fully<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match writer.write(&bytes[offset..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    flush(writer)
}

fn flush<W: Write>(writer: &mut W) -> Result<()> {
    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}
