use std::net::SocketAddr;

/// Errors that can occur while establishing or using the host stream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The address could not be resolved to any socket address.
    #[error("failed to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to open a stream to the resolved address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The underlying I/O error.
    pub fn io_error(&self) -> &std::io::Error {
        match self {
            TransportError::Resolve { source, .. } | TransportError::Connect { source, .. } => {
                source
            }
            TransportError::Io(source) => source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
