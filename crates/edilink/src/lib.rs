//! Client for length-prefixed, acknowledged EDI exchanges with legacy hosts.
//!
//! A session opens a TCP stream, passes a fixed-token security handshake,
//! then exchanges frames (a 2-byte big-endian length and the payload), each
//! answered by a one-byte acknowledgment. Teardown sends a negative length.
//!
//! # Crate Structure
//!
//! - [`transport`]: Address resolution, TCP connect, the `Transport` trait
//! - [`frame`]: Length codec, payload reader/writer, acknowledgment bytes
//! - [`session`]: Handshake, acknowledged send/receive, teardown, `Status`
//!
//! ```no_run
//! let mut session = edilink::session::connect("edihost:30001")?;
//! session.send("ISA*00*...")?;
//! let reply = session.recv()?;
//! println!("{} ({} bytes)", reply.text(), reply.status.len());
//! session.disconnect()?;
//! # Ok::<(), edilink::session::SessionError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use edilink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use edilink_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use edilink_session::*;
}
