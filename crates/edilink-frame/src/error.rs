/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit in a 16-bit signed length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a length field or ack byte arrived.
    #[error("connection closed")]
    ConnectionClosed,

    /// The connection was closed part way through a payload.
    #[error("connection closed after {received} of {expected} payload bytes")]
    Truncated { expected: usize, received: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
