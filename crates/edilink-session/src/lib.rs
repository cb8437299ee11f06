//! Session layer for the EDI host link.
//!
//! Connect to a host, exchange acknowledged frames, and tear the session
//! down. Every operation yields a [`Status`]: success values carry a
//! code-0 status and failures carry a [`SessionError`] that converts into
//! one, so callers can branch on the numeric code the host protocol uses.

pub mod connector;
pub mod error;
pub mod handshake;
pub mod log;
pub mod session;
pub mod state;
pub mod status;

pub use connector::{connect, connect_with_config};
pub use error::{Result, SessionError};
pub use handshake::{
    handshake_client, HandshakeConfig, HandshakeResult, HandshakeStep, DEFAULT_REPLY_CAPACITY,
    DEFAULT_TOKEN,
};
pub use log::{LogHandle, NoopLog, SessionLog, TracingLog};
pub use session::{Received, Session, SessionConfig};
pub use state::SessionState;
pub use status::{code, op, Status};
