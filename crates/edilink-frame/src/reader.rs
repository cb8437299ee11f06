use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::trace;

use crate::codec::{decode_length, FrameConfig, ReceiveMode, LENGTH_SIZE};
use crate::error::{FrameError, Result};

/// Read a frame length field (blocking).
///
/// Exactly [`LENGTH_SIZE`] bytes are read into a fresh buffer. A negative
/// value is returned as-is; interpreting it is up to the caller.
pub fn read_length<R: Read>(reader: &mut R) -> Result<i16> {
    let mut raw = [0u8; LENGTH_SIZE];
    fill(reader, &mut raw)?;
    let len = decode_length(raw);
    trace!(len, "read frame length");
    Ok(len)
}

/// Read the payload of a frame whose declared length is `declared` (blocking).
///
/// Reads are issued until at least `declared` bytes have arrived. Only the
/// bytes each read actually returned are kept. Under
/// [`ReceiveMode::Chunked`] the last read may return more than was owed and
/// the surplus stays in the result.
pub fn read_payload<R: Read>(
    reader: &mut R,
    declared: usize,
    config: &FrameConfig,
) -> Result<BytesMut> {
    let mut buf = BytesMut::with_capacity(declared);
    let mut chunk = vec![0u8; config.read_chunk_size.max(1)];

    while buf.len() < declared {
        let want = match config.receive_mode {
            ReceiveMode::Chunked => chunk.len(),
            ReceiveMode::Exact => (declared - buf.len()).min(chunk.len()),
        };
        let read = match reader.read(&mut chunk[..want]) {
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        };

        if read == 0 {
            return Err(FrameError::Truncated {
                expected: declared,
                received: buf.len(),
            });
        }

        buf.extend_from_slice(&chunk[..read]);
    }

    trace!(declared, received = buf.len(), "read frame payload");
    Ok(buf)
}

/// Read a single acknowledgment byte (blocking).
pub fn read_ack<R: Read>(reader: &mut R) -> Result<u8> {
    let mut raw = [0u8; 1];
    fill(reader, &mut raw)?;
    Ok(raw[0])
}

fn fill<R: Read>(reader: &mut R, dst: &mut [u8]) -> Result<()> {
    let mut filled = 0usize;
    while filled < dst.len() {
        match reader.read(&mut dst[filled..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}
