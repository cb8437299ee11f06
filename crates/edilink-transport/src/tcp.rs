use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::EdiStream;

/// Resolve a `host:port` string to socket addresses.
///
/// An address that resolves to nothing is reported as a resolution failure.
pub fn resolve(addr: &str) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|e| TransportError::Resolve {
            addr: addr.to_string(),
            source: e,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(TransportError::Resolve {
            addr: addr.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "address resolved to no socket addresses",
            ),
        });
    }

    debug!(addr, resolved = ?addrs, "resolved host address");
    Ok(addrs)
}

/// Open a TCP stream to the first reachable address (blocking).
///
/// Addresses are tried in order; the error from the last attempt is
/// returned when none accept.
pub fn connect(addrs: &[SocketAddr], timeout: Option<Duration>) -> Result<EdiStream> {
    let mut last_err = None;

    for &addr in addrs {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => {
                debug!(%addr, "connected to host");
                return Ok(EdiStream::from_tcp(stream, addr));
            }
            Err(err) => {
                debug!(%addr, error = %err, "connect attempt failed");
                last_err = Some(TransportError::Connect { addr, source: err });
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "no addresses to connect to",
        ))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Transport;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    #[test]
    fn test_resolve_loopback() {
        let addrs = resolve("127.0.0.1:6000").unwrap();
        assert_eq!(addrs, vec!["127.0.0.1:6000".parse::<SocketAddr>().unwrap()]);
    }

    #[test]
    fn test_resolve_rejects_missing_port() {
        let result = resolve("127.0.0.1");
        assert!(matches!(result, Err(TransportError::Resolve { .. })));
    }

    #[test]
    fn test_resolve_rejects_unknown_host() {
        let result = resolve("not-a-host:0");
        assert!(matches!(result, Err(TransportError::Resolve { .. })));
    }

    #[test]
    fn test_connect_and_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = std::thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            server.read_exact(&mut buf).unwrap();
            assert_eq!(&buf, b"hello");
        });

        let mut client = connect(&[addr], None).unwrap();
        assert_eq!(client.peer_addr(), addr);
        assert_eq!(client.peer_label(), addr.to_string());
        client.write_all(b"hello").unwrap();

        handle.join().unwrap();
        client.close().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        // Bind then drop to get a port nothing listens on.
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let result = connect(&[addr], Some(Duration::from_secs(1)));
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[test]
    fn test_connect_empty_address_list() {
        let result = connect(&[], None);
        assert!(matches!(result, Err(TransportError::Io(_))));
    }

    #[test]
    fn test_close_after_peer_hangup() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = connect(&[addr], None).unwrap();
        let (server, _) = listener.accept().unwrap();
        drop(server);

        assert!(client.close().is_ok());
    }
}
