use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A bidirectional byte stream the protocol layers can run over.
///
/// Anything that is `Read + Write` and can be closed qualifies. The session
/// layer calls [`Transport::close`] exactly once, during teardown.
pub trait Transport: Read + Write {
    /// Shut down both directions of the stream.
    fn close(&mut self) -> std::io::Result<()>;

    /// Human-readable name of the remote end, for diagnostics.
    fn peer_label(&self) -> String {
        "unknown".to_string()
    }
}

/// A connected TCP stream to an EDI host.
pub struct EdiStream {
    inner: TcpStream,
    peer: SocketAddr,
}

impl EdiStream {
    pub(crate) fn from_tcp(inner: TcpStream, peer: SocketAddr) -> Self {
        Self { inner, peer }
    }

    /// The resolved address this stream is connected to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }
}

impl Read for EdiStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for EdiStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl Transport for EdiStream {
    fn close(&mut self) -> std::io::Result<()> {
        match self.inner.shutdown(Shutdown::Both) {
            // The host may have hung up first.
            Err(err) if err.kind() == ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }

    fn peer_label(&self) -> String {
        self.peer.to_string()
    }
}

impl std::fmt::Debug for EdiStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdiStream")
            .field("type", &"tcp")
            .field("peer", &self.peer)
            .finish()
    }
}
